//! Domain entities
//!
//! Core business objects that describe an extraction run and the
//! environment it runs against.

mod event;
mod find_spec;
mod knowledge_base;
mod path_spec;
mod processing_status;
mod session;

pub use event::{EventRecord, ExtractionWarning};
pub use find_spec::{FindSpec, FindSpecSet};
pub use knowledge_base::{KnowledgeBase, OperatingSystem};
pub use path_spec::{PathSpec, PathSpecKind, SourceType};
pub use processing_status::{ProcessingState, ProcessingStatus, StatusCallback, WorkerStatus};
pub use session::RunSession;
