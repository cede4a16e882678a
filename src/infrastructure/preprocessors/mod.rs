//! Source preprocessors

mod filesystem;

pub use filesystem::FileSystemPreprocessor;
