//! Storage writer implementations

mod json_lines;
mod memory;

pub use json_lines::{JsonLinesStorageFactory, JsonLinesStorageWriter};
pub use memory::{MemoryStorage, MemoryStorageFactory, MemoryStorageWriter, StoredRuns};
