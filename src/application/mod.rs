//! Application layer
//!
//! The extraction frontend and the steps it sequences for a run.

pub mod dto;
mod extraction_frontend;
mod preprocessing;
mod run_state;
mod session_builder;
mod storage_target;

pub use extraction_frontend::{DEFAULT_TIMEZONE, ExtractionFrontend};
pub use preprocessing::PreprocessingCoordinator;
pub use run_state::{RunState, RunTracker};
pub use session_builder::{SessionArgs, SessionBuilder};
pub use storage_target::StorageTarget;
