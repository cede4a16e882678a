//! Data Transfer Objects

mod processing_options;

pub use processing_options::ProcessingOptions;
