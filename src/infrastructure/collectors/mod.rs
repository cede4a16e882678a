//! Source collectors

mod filesystem;

pub use filesystem::FileSystemCollector;
