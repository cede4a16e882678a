//! Parser filter expression syntax
//!
//! An expression is a comma separated list of preset, parser or
//! `parser/plugin` names. A leading `!` excludes the element.

use crate::domain::repositories::RegistryError;

/// Parsed parser filter expression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl ParserFilter {
    /// Parses an expression; names are normalized to lower case
    pub fn parse(expression: &str) -> Result<Self, RegistryError> {
        let mut filter = ParserFilter::default();

        for element in expression.split(',') {
            let element = element.trim().to_lowercase();
            let (excluded, name) = match element.strip_prefix('!') {
                Some(rest) => (true, rest.trim().to_string()),
                None => (false, element),
            };

            validate_name(&name, expression)?;

            if excluded {
                filter.excludes.push(name);
            } else {
                filter.includes.push(name);
            }
        }

        Ok(filter)
    }
}

fn validate_name(name: &str, expression: &str) -> Result<(), RegistryError> {
    let invalid = |reason: &str| {
        RegistryError::InvalidFilterExpression(format!("{reason} in \"{expression}\""))
    };

    if name.is_empty() {
        return Err(invalid("empty element"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/')
    {
        return Err(invalid(&format!("illegal character in \"{name}\"")));
    }

    let mut parts = name.split('/');
    let valid_parts = match (parts.next(), parts.next(), parts.next()) {
        (Some(parser), None, None) => !parser.is_empty(),
        (Some(parser), Some(plugin), None) => !parser.is_empty() && !plugin.is_empty(),
        _ => false,
    };
    if !valid_parts {
        return Err(invalid(&format!("malformed name \"{name}\"")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_includes_and_excludes() {
        let filter = ParserFilter::parse(" WinXP , !winreg/ccleaner,filestat").unwrap();
        assert_eq!(filter.includes, vec!["winxp", "filestat"]);
        assert_eq!(filter.excludes, vec!["winreg/ccleaner"]);
    }

    #[test]
    fn test_empty_element_is_rejected() {
        assert!(ParserFilter::parse("winxp,,linux").is_err());
        assert!(ParserFilter::parse("!").is_err());
    }

    #[test]
    fn test_malformed_names_are_rejected() {
        assert!(ParserFilter::parse("winreg/").is_err());
        assert!(ParserFilter::parse("a/b/c").is_err());
        assert!(ParserFilter::parse("sql;ite").is_err());
    }
}
