//! Extracted event entity

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A single timestamped artifact produced by a parser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub timestamp_description: String,
    pub data_type: String,
    pub parser: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl EventRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        timestamp_description: &str,
        data_type: &str,
        parser: &str,
        display_name: String,
    ) -> Self {
        Self {
            timestamp,
            timestamp_description: timestamp_description.to_string(),
            data_type: data_type.to_string(),
            parser: parser.to_string(),
            display_name,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute to the event
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

/// A non-fatal error raised while extracting from one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionWarning {
    pub parser: Option<String>,
    pub path_spec: String,
    pub message: String,
}
