//! Per-entry extraction shared by both engines

use crate::domain::entities::{EventRecord, ExtractionWarning, PathSpec};
use crate::domain::repositories::{ExtractionContext, Extractor};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything produced while extracting one entry
#[derive(Debug, Default)]
pub(crate) struct EntryResult {
    pub events: Vec<EventRecord>,
    pub warnings: Vec<ExtractionWarning>,
    /// Set when an extractor panicked and the panic was caught
    pub crashed: bool,
    pub parser_timings: Vec<(String, Duration)>,
    pub elapsed: Duration,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs every enabled extractor over one entry
///
/// Extractor errors become warnings. With `catch_panics` set a panicking
/// extractor is recorded as a crash instead of unwinding the caller.
pub(crate) fn extract_entry(
    extractors: &[Arc<dyn Extractor>],
    path_spec: &PathSpec,
    context: &ExtractionContext,
    catch_panics: bool,
) -> EntryResult {
    let start = Instant::now();
    let mut result = EntryResult::default();

    for extractor in extractors {
        let parser_start = Instant::now();
        let outcome = if catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path_spec, context)))
        } else {
            Ok(extractor.extract(path_spec, context))
        };
        result
            .parser_timings
            .push((extractor.name().to_string(), parser_start.elapsed()));

        match outcome {
            Ok(Ok(events)) => result.events.extend(events),
            Ok(Err(e)) => result.warnings.push(ExtractionWarning {
                parser: Some(extractor.name().to_string()),
                path_spec: path_spec.to_string(),
                message: e.to_string(),
            }),
            Err(payload) => {
                result.crashed = true;
                result.warnings.push(ExtractionWarning {
                    parser: Some(extractor.name().to_string()),
                    path_spec: path_spec.to_string(),
                    message: format!("parser crashed: {}", panic_message(payload.as_ref())),
                });
            }
        }
    }

    result.elapsed = start.elapsed();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::ExtractorError;
    use chrono::Utc;

    struct Fixed(&'static str);

    impl Extractor for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn extract(
            &self,
            path_spec: &PathSpec,
            context: &ExtractionContext,
        ) -> Result<Vec<EventRecord>, ExtractorError> {
            Ok(vec![EventRecord::new(
                Utc::now(),
                "Test Time",
                "test:entry",
                self.0,
                context.display_name(path_spec),
            )])
        }
    }

    struct Failing;

    impl Extractor for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn extract(
            &self,
            _path_spec: &PathSpec,
            _context: &ExtractionContext,
        ) -> Result<Vec<EventRecord>, ExtractorError> {
            Err(ExtractorError::Parse("bad header".into()))
        }
    }

    struct Panicking;

    impl Extractor for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn extract(
            &self,
            _path_spec: &PathSpec,
            _context: &ExtractionContext,
        ) -> Result<Vec<EventRecord>, ExtractorError> {
            panic!("segment violation")
        }
    }

    #[test]
    fn test_errors_become_warnings() {
        let extractors: Vec<Arc<dyn Extractor>> = vec![Arc::new(Fixed("one")), Arc::new(Failing)];
        let result = extract_entry(
            &extractors,
            &PathSpec::os("/evidence/a"),
            &ExtractionContext::default(),
            false,
        );
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.crashed);
        assert_eq!(result.parser_timings.len(), 2);
    }

    #[test]
    fn test_caught_panic_marks_crash() {
        let extractors: Vec<Arc<dyn Extractor>> = vec![Arc::new(Panicking), Arc::new(Fixed("after"))];
        let result = extract_entry(
            &extractors,
            &PathSpec::os("/evidence/b"),
            &ExtractionContext::default(),
            true,
        );
        assert!(result.crashed);
        assert!(result.warnings[0].message.contains("segment violation"));
        assert_eq!(result.events.len(), 1);
    }
}
