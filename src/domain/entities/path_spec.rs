//! Path specification entity
//!
//! An opaque descriptor for one item to extract from. The orchestrator
//! never interprets it beyond passing it to collaborators.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of location a path specification points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSpecKind {
    /// Location on the host operating system
    Os,
    /// Raw storage media image
    StorageMediaImage,
    /// Storage media device node
    StorageMediaDevice,
}

/// Describes one item to extract from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PathSpec {
    kind: PathSpecKind,
    location: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Box<PathSpec>>,
}

impl PathSpec {
    /// Creates a path specification for an operating system location
    pub fn os(location: impl Into<PathBuf>) -> Self {
        Self {
            kind: PathSpecKind::Os,
            location: location.into(),
            parent: None,
        }
    }

    /// Creates a path specification of the given kind
    pub fn new(kind: PathSpecKind, location: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            location: location.into(),
            parent: None,
        }
    }

    /// Nests this specification inside a parent
    pub fn with_parent(mut self, parent: PathSpec) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn kind(&self) -> PathSpecKind {
        self.kind
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn parent(&self) -> Option<&PathSpec> {
        self.parent.as_deref()
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} -> ", parent)?;
        }
        write!(f, "{}", self.location.display())
    }
}

/// Type of the source being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    File,
    Directory,
    StorageMediaDevice,
    StorageMediaImage,
    Other,
}

impl SourceType {
    /// Returns whether sources of this type are preprocessed by default
    pub fn requires_preprocessing(&self) -> bool {
        matches!(
            self,
            SourceType::Directory | SourceType::StorageMediaDevice | SourceType::StorageMediaImage
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceType::File => "file",
            SourceType::Directory => "directory",
            SourceType::StorageMediaDevice => "storage media device",
            SourceType::StorageMediaImage => "storage media image",
            SourceType::Other => "other",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
