//! Static parser registry
//!
//! Resolves parser filter expressions against an in-memory catalog of
//! parsers, their plugins, presets and hashers.

use super::catalog;
use crate::domain::repositories::{ComponentInfo, ParserRegistry, RegistryError};
use crate::domain::services::ParserFilter;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct ParserEntry {
    description: String,
    plugins: BTreeSet<String>,
}

/// Parsers selected by an expression, with the plugins selected for each
type Selection = BTreeMap<String, BTreeSet<String>>;

/// Registry backed by a fixed catalog
///
/// # Example
///
/// ```
/// use loupe::domain::repositories::ParserRegistry;
/// use loupe::infrastructure::registry::StaticParserRegistry;
///
/// let registry = StaticParserRegistry::builtin();
/// let names = registry.list_parser_names(Some("winxp")).unwrap();
/// assert!(names.contains(&"winevt".to_string()));
/// assert!(!names.contains(&"winevtx".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticParserRegistry {
    parsers: BTreeMap<String, ParserEntry>,
    presets: BTreeMap<String, Vec<String>>,
    hashers: BTreeMap<String, String>,
}

impl StaticParserRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in catalog
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, description, plugins) in catalog::PARSERS {
            registry.register_parser(name, description, plugins);
        }
        for (name, members) in catalog::PRESETS {
            registry.register_preset(name, members);
        }
        for (name, description) in catalog::HASHERS {
            registry.register_hasher(name, description);
        }
        registry
    }

    pub fn register_parser(&mut self, name: &str, description: &str, plugins: &[&str]) {
        self.parsers.insert(
            name.to_lowercase(),
            ParserEntry {
                description: description.to_string(),
                plugins: plugins.iter().map(|plugin| plugin.to_lowercase()).collect(),
            },
        );
    }

    /// Registers a preset; members may name other presets
    pub fn register_preset(&mut self, name: &str, members: &[&str]) {
        self.presets.insert(
            name.to_lowercase(),
            members.iter().map(|member| member.to_lowercase()).collect(),
        );
    }

    pub fn register_hasher(&mut self, name: &str, description: &str) {
        self.hashers
            .insert(name.to_lowercase(), description.to_string());
    }

    /// Adds the parsers and plugins `name` stands for to `selection`
    fn expand(
        &self,
        name: &str,
        visiting: &mut Vec<String>,
        selection: &mut Selection,
    ) -> Result<(), RegistryError> {
        if let Some(members) = self.presets.get(name) {
            // Nested presets may refer back to a preset being expanded.
            if visiting.iter().any(|preset| preset == name) {
                return Ok(());
            }
            visiting.push(name.to_string());
            for member in members {
                self.expand(member, visiting, selection)?;
            }
            visiting.pop();
            return Ok(());
        }

        if let Some(entry) = self.parsers.get(name) {
            selection
                .entry(name.to_string())
                .or_default()
                .extend(entry.plugins.iter().cloned());
            return Ok(());
        }

        if let Some((parser, plugin)) = name.split_once('/') {
            let known = self
                .parsers
                .get(parser)
                .is_some_and(|entry| entry.plugins.contains(plugin));
            if known {
                selection
                    .entry(parser.to_string())
                    .or_default()
                    .insert(plugin.to_string());
                return Ok(());
            }
        }

        Err(RegistryError::InvalidFilterExpression(format!(
            "unknown parser, plugin or preset \"{name}\""
        )))
    }

    /// Resolves an expression into the selected parsers and plugins
    fn select(&self, filter_expression: Option<&str>) -> Result<Selection, RegistryError> {
        let filter = match filter_expression
            .map(str::trim)
            .filter(|expression| !expression.is_empty())
        {
            Some(expression) => ParserFilter::parse(expression)?,
            None => ParserFilter::default(),
        };

        let mut selection = Selection::new();
        if filter.includes.is_empty() {
            for (name, entry) in &self.parsers {
                selection.insert(name.clone(), entry.plugins.clone());
            }
        } else {
            for name in &filter.includes {
                self.expand(name, &mut Vec::new(), &mut selection)?;
            }
        }

        let mut excluded = Selection::new();
        for name in &filter.excludes {
            self.expand(name, &mut Vec::new(), &mut excluded)?;
        }

        for (parser, plugins) in excluded {
            let whole_parser = self
                .parsers
                .get(&parser)
                .is_some_and(|entry| entry.plugins == plugins);
            if whole_parser {
                selection.remove(&parser);
            } else if let Some(selected) = selection.get_mut(&parser) {
                selected.retain(|plugin| !plugins.contains(plugin));
            }
        }

        Ok(selection)
    }
}

impl ParserRegistry for StaticParserRegistry {
    fn list_parser_and_plugin_names(
        &self,
        filter_expression: Option<&str>,
    ) -> Result<Vec<String>, RegistryError> {
        let selection = self.select(filter_expression)?;

        let mut names = Vec::new();
        for (parser, plugins) in selection {
            names.extend(plugins.iter().map(|plugin| format!("{parser}/{plugin}")));
            names.push(parser);
        }
        names.sort();
        Ok(names)
    }

    fn list_parser_names(
        &self,
        filter_expression: Option<&str>,
    ) -> Result<Vec<String>, RegistryError> {
        Ok(self.select(filter_expression)?.into_keys().collect())
    }

    fn list_hasher_names(&self, hasher_names: Option<&str>) -> Vec<String> {
        let Some(hasher_names) = hasher_names else {
            return Vec::new();
        };

        let requested: Vec<String> = hasher_names
            .split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        if requested.iter().any(|name| name == "all") {
            return self.hashers.keys().cloned().collect();
        }

        let mut names = Vec::new();
        for name in requested {
            if self.hashers.contains_key(&name) && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn hashers_information(&self) -> Vec<ComponentInfo> {
        self.hashers
            .iter()
            .map(|(name, description)| ComponentInfo::new(name, description))
            .collect()
    }

    fn parsers_information(&self) -> Vec<ComponentInfo> {
        self.parsers
            .iter()
            .map(|(name, entry)| ComponentInfo::new(name, &entry.description))
            .collect()
    }

    fn parser_plugins_information(
        &self,
        filter_expression: Option<&str>,
    ) -> Result<Vec<ComponentInfo>, RegistryError> {
        let selection = self.select(filter_expression)?;

        Ok(selection
            .iter()
            .flat_map(|(parser, plugins)| {
                plugins.iter().map(move |plugin| {
                    ComponentInfo::new(
                        format!("{parser}/{plugin}"),
                        format!("Plugin of the {parser} parser."),
                    )
                })
            })
            .collect())
    }

    fn parser_presets_information(&self) -> Vec<ComponentInfo> {
        self.presets
            .iter()
            .map(|(name, members)| ComponentInfo::new(name, members.join(", ")))
            .collect()
    }

    fn names_of_parsers_with_plugins(&self) -> Vec<String> {
        self.parsers
            .iter()
            .filter(|(_, entry)| !entry.plugins.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}
