//! Loupe: extraction run orchestration for forensic artifact timelines.
//!
//! A run takes a set of sources, discovers facts about the environment they
//! came from, picks the parsers that fit it and hands the work to a single
//! or multi-process engine that writes events to storage.

pub mod application;
pub mod core;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use application::ExtractionFrontend;
pub use application::dto::ProcessingOptions;
pub use core::{ExtractionError, Outcome, Result};
pub use domain::entities::{
    KnowledgeBase, OperatingSystem, PathSpec, ProcessingStatus, RunSession, SourceType,
};
pub use engine::{AbortFlag, Engine, EngineMode};
