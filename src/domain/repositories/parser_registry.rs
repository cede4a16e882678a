//! Parser registry trait
//!
//! Defines the interface for resolving parser filter expressions and hasher
//! name lists into the concrete components a run enables.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by a parser registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid parser filter expression: {0}")]
    InvalidFilterExpression(String),
}

/// Name and description of a registered component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub name: String,
    pub description: String,
}

impl ComponentInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Registry of the parsers, plugins, presets and hashers available to a run
///
/// A filter expression of `None` selects every parser and plugin.
///
/// # Example
///
/// ```ignore
/// let registry = StaticParserRegistry::default();
/// let names = registry.list_parser_and_plugin_names(Some("winxp"))?;
/// assert!(names.contains(&"winreg".to_string()));
/// ```
pub trait ParserRegistry: Send + Sync {
    /// Lists parser names and `parser/plugin` names selected by the expression
    fn list_parser_and_plugin_names(
        &self,
        filter_expression: Option<&str>,
    ) -> Result<Vec<String>, RegistryError>;

    /// Lists the parser names selected by the expression
    fn list_parser_names(&self, filter_expression: Option<&str>)
    -> Result<Vec<String>, RegistryError>;

    /// Lists the hasher names selected by a comma separated string
    fn list_hasher_names(&self, hasher_names: Option<&str>) -> Vec<String>;

    fn hashers_information(&self) -> Vec<ComponentInfo>;

    fn parsers_information(&self) -> Vec<ComponentInfo>;

    /// Lists the plugins selected by the expression
    fn parser_plugins_information(
        &self,
        filter_expression: Option<&str>,
    ) -> Result<Vec<ComponentInfo>, RegistryError>;

    /// Lists preset names with their comma separated members
    fn parser_presets_information(&self) -> Vec<ComponentInfo>;

    fn names_of_parsers_with_plugins(&self) -> Vec<String>;
}
