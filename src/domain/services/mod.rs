//! Domain services
//!
//! Pure decision logic operating on domain entities.

mod find_specs;
mod parser_filter;
mod parser_preset;

pub use find_specs::{build_find_specs, build_find_specs_from_file};
pub use parser_filter::ParserFilter;
pub use parser_preset::{ParserPreset, resolve_parser_filter_preset};
