//! Session builder
//!
//! Assembles the run session, snapshotting the parser and plugin names the
//! registry resolves for the parser filter expression the run will use.

use crate::core::Result;
use crate::domain::entities::RunSession;
use crate::domain::repositories::ParserRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs recorded in a run session
#[derive(Debug, Clone, Default)]
pub struct SessionArgs {
    pub command_line_arguments: Option<String>,
    pub filter_expression: Option<String>,
    pub filter_file: Option<PathBuf>,
    pub debug_mode: bool,
    /// The resolved expression, never the raw caller input
    pub parser_filter_expression: Option<String>,
    pub preferred_encoding: String,
    pub preferred_year: Option<i32>,
}

pub struct SessionBuilder {
    registry: Arc<dyn ParserRegistry>,
}

impl SessionBuilder {
    pub fn new(registry: Arc<dyn ParserRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the session
    ///
    /// Fails with `InvalidConfiguration` if the registry rejects the parser
    /// filter expression.
    pub fn build(&self, args: SessionArgs) -> Result<RunSession> {
        let enabled_parser_names = self
            .registry
            .list_parser_and_plugin_names(args.parser_filter_expression.as_deref())?;

        let session = RunSession::new()
            .with_command_line_arguments(args.command_line_arguments)
            .with_enabled_parser_names(enabled_parser_names)
            .with_filter_expression(args.filter_expression)
            .with_filter_file(args.filter_file)
            .with_debug_mode(args.debug_mode)
            .with_parser_filter_expression(args.parser_filter_expression)
            .with_preferred_encoding(args.preferred_encoding)
            .with_preferred_year(args.preferred_year);

        tracing::debug!(
            "Session {} enables {} parsers and plugins",
            session.identifier(),
            session.enabled_parser_names().len()
        );
        Ok(session)
    }
}
