//! Repository traits (interfaces)
//!
//! These traits define the contracts for the collaborators an extraction
//! run depends on but does not implement.

mod extractor;
mod parser_registry;
mod source;
mod storage_writer;

pub use extractor::{ExtractionContext, Extractor, ExtractorError};
pub use parser_registry::{ComponentInfo, ParserRegistry, RegistryError};
pub use source::{CollectorError, Preprocessor, SourceCollector};
pub use storage_writer::{StorageError, StorageWriter, StorageWriterFactory};
