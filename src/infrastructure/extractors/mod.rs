//! Extractor implementations

mod filestat;

pub use filestat::FileStatExtractor;
