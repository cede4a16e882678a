//! Parser registry implementations

mod catalog;
mod static_registry;

pub use static_registry::StaticParserRegistry;
