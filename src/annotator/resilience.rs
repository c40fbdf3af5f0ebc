//! Fault containment for annotation engines.
//!
//! The error counting aspect absorbs single failures and substitutes an empty
//! result for that document, counting each one.
//! Once the count exceeds a threshold fixed at construction the engine is
//! considered broken and the task is aborted with
//! [`Error::TooManySingleErrors`].
//!
//! ```text
//! max_errors = ceil(tolerance × expected_calls)      tolerance = 0.25
//!
//! failure #1 .. #max_errors   ──► logged, counted, empty result
//! failure #max_errors + 1     ──► TooManySingleErrors (fatal)
//! ```
//!
//! Failed calls are never retried.

use super::decorator::{create_decorator, Aspect, CallOutcome, Decorated};
use super::{Annotator, Capability, ExperimentType};
use crate::eval::{EvaluationResult, EvaluationResultContainer};
use crate::{Error, Result};
use std::fmt;

/// Default fraction of expected calls that may fail.
pub const DEFAULT_TOLERATED_ERROR_FRACTION: f64 = 0.25;

/// Name of the result leaf reporting the number of absorbed failures.
pub const ERROR_COUNT_RESULT_NAME: &str = "error count";

/// Error counting aspect state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCounting {
    error_count: usize,
    max_errors: usize,
    log_results: bool,
}

impl ErrorCounting {
    /// Tolerate up to `max_errors` failures.
    #[must_use]
    pub fn new(max_errors: usize) -> Self {
        Self {
            error_count: 0,
            max_errors,
            log_results: true,
        }
    }

    /// Tolerate `ceil(tolerance × expected_calls)` failures.
    pub fn for_expected_calls(expected_calls: usize, tolerance: f64) -> Result<Self> {
        Ok(Self::new(max_errors_for(expected_calls, tolerance)?))
    }

    /// Whether successful results are written to the debug log.
    #[must_use]
    pub fn with_result_logging(mut self, enabled: bool) -> Self {
        self.log_results = enabled;
        self
    }

    /// Failures absorbed so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Failures tolerated before the task is aborted.
    #[must_use]
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    fn absorb<T>(&mut self, annotator: &str, capability: Capability, error: Error) -> CallOutcome<Vec<T>> {
        if self.error_count == 0 {
            log::error!(
                "Got an error from the annotator ({}) during {}: {:?}",
                annotator,
                capability,
                error
            );
        } else {
            log::error!("Got an error from the annotator ({}): {}", annotator, error);
        }
        self.error_count += 1;
        if self.error_count > self.max_errors {
            log::error!(
                "Annotator ({}) exceeded its error tolerance ({} > {})",
                annotator,
                self.error_count,
                self.max_errors
            );
            return CallOutcome::Aborted(Error::TooManySingleErrors {
                max_errors: self.max_errors,
                error_count: self.error_count,
            });
        }
        CallOutcome::Substituted {
            value: Vec::new(),
            error,
        }
    }
}

/// Threshold for `expected_calls` calls at the given tolerance.
///
/// `tolerance` must be a finite fraction in `[0, 1]`.
pub fn max_errors_for(expected_calls: usize, tolerance: f64) -> Result<usize> {
    if !tolerance.is_finite() || !(0.0..=1.0).contains(&tolerance) {
        return Err(Error::configuration(format!(
            "tolerated error fraction must lie in [0, 1], got {tolerance}"
        )));
    }
    Ok((tolerance * expected_calls as f64).ceil() as usize)
}

impl Aspect for ErrorCounting {
    fn apply<T, F>(&mut self, annotator: &str, capability: Capability, call: F) -> CallOutcome<Vec<T>>
    where
        T: fmt::Debug,
        F: FnOnce() -> Result<Vec<T>>,
    {
        match call() {
            Ok(result) => {
                if self.log_results && log::log_enabled!(log::Level::Debug) {
                    log::debug!("[{}] {} result={:?}", annotator, capability, result);
                }
                CallOutcome::Completed(result)
            }
            // An inner decorator already gave up, or the setup is broken.
            Err(error) if error.is_fatal() => CallOutcome::Aborted(error),
            Err(error) => self.absorb(annotator, capability, error),
        }
    }

    fn contribute(&self, results: &mut EvaluationResultContainer) -> Result<()> {
        results.add(EvaluationResult::int(
            ERROR_COUNT_RESULT_NAME,
            self.error_count as i64,
        ))
    }
}

/// An engine wrapped with error counting.
pub type ErrorCountingAnnotator<A> = Decorated<A, ErrorCounting>;

impl<A: Annotator> Decorated<A, ErrorCounting> {
    /// Failures absorbed so far.
    pub fn error_count(&self) -> usize {
        self.aspect().error_count()
    }

    /// Failures tolerated before the task is aborted.
    pub fn max_errors(&self) -> usize {
        self.aspect().max_errors()
    }
}

/// Wrap `engine` with error counting at the default tolerance of 25%.
pub fn create_error_counting_decorator<A: Annotator>(
    experiment_type: ExperimentType,
    engine: A,
    expected_calls: usize,
) -> Result<ErrorCountingAnnotator<A>> {
    create_error_counting_decorator_with_tolerance(
        experiment_type,
        engine,
        expected_calls,
        DEFAULT_TOLERATED_ERROR_FRACTION,
    )
}

/// Wrap `engine` with error counting at a custom tolerance.
pub fn create_error_counting_decorator_with_tolerance<A: Annotator>(
    experiment_type: ExperimentType,
    engine: A,
    expected_calls: usize,
    tolerance: f64,
) -> Result<ErrorCountingAnnotator<A>> {
    let aspect = ErrorCounting::for_expected_calls(expected_calls, tolerance)?;
    create_decorator(experiment_type, engine, aspect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::{CapabilitySet, MockAnnotator};
    use crate::document::Document;
    use crate::marking::Span;

    fn recognizer() -> MockAnnotator {
        MockAnnotator::new("recognizer", CapabilitySet::of(&[Capability::Recognition]))
            .with_markings("ok", vec![Span::new(0, 4).into()])
            .failing_on("bad")
    }

    #[test]
    fn test_max_errors_is_ceiling() {
        assert_eq!(max_errors_for(0, 0.25).unwrap(), 0);
        assert_eq!(max_errors_for(1, 0.25).unwrap(), 1);
        assert_eq!(max_errors_for(4, 0.25).unwrap(), 1);
        assert_eq!(max_errors_for(5, 0.25).unwrap(), 2);
        assert_eq!(max_errors_for(10, 0.25).unwrap(), 3);
        assert_eq!(max_errors_for(100, 0.25).unwrap(), 25);
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(max_errors_for(10, -0.1).is_err());
        assert!(max_errors_for(10, 1.5).is_err());
        assert!(max_errors_for(10, f64::NAN).is_err());
    }

    #[test]
    fn test_success_passes_through() {
        let mut decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 4).unwrap();
        let spans = decorated
            .perform_recognition(&Document::new("text", "ok"))
            .unwrap();
        assert_eq!(spans, vec![Span::new(0, 4)]);
        assert_eq!(decorated.error_count(), 0);
    }

    #[test]
    fn test_failure_substitutes_empty_result() {
        let mut decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 4).unwrap();
        let spans = decorated
            .perform_recognition(&Document::new("text", "bad"))
            .unwrap();
        assert!(spans.is_empty());
        assert_eq!(decorated.error_count(), 1);
    }

    #[test]
    fn test_threshold_exceeded_aborts() {
        // 8 expected calls -> 2 tolerated failures
        let mut decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 8).unwrap();
        assert_eq!(decorated.max_errors(), 2);
        let bad = Document::new("text", "bad");
        assert!(decorated.perform_recognition(&bad).is_ok());
        assert!(decorated.perform_recognition(&bad).is_ok());
        let err = decorated.perform_recognition(&bad).unwrap_err();
        assert!(matches!(
            err,
            Error::TooManySingleErrors {
                max_errors: 2,
                error_count: 3
            }
        ));
    }

    #[test]
    fn test_zero_tolerance_aborts_on_first_failure() {
        let mut decorated = create_error_counting_decorator_with_tolerance(
            ExperimentType::ERec,
            recognizer(),
            10,
            0.0,
        )
        .unwrap();
        let err = decorated
            .perform_recognition(&Document::new("text", "bad"))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_count_result_always_emitted() {
        let decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 4).unwrap();
        let mut results = EvaluationResultContainer::new();
        decorated.aspect().contribute(&mut results).unwrap();
        assert_eq!(results.value(ERROR_COUNT_RESULT_NAME), Some(0.0));
    }

    #[test]
    fn test_fatal_inner_error_is_not_absorbed() {
        let mut aspect = ErrorCounting::new(5);
        let outcome: CallOutcome<Vec<Span>> = aspect.apply("x", Capability::Recognition, || {
            Err(Error::TooManySingleErrors {
                max_errors: 0,
                error_count: 1,
            })
        });
        assert!(outcome.is_aborted());
        assert_eq!(aspect.error_count(), 0);
    }

    // =========================================================================
    // Log output
    // =========================================================================

    /// Keeps every record logged on the current thread.
    struct CaptureLogger;

    thread_local! {
        static RECORDS: std::cell::RefCell<Vec<(log::Level, String)>> =
            std::cell::RefCell::new(Vec::new());
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            let line = (record.level(), record.args().to_string());
            RECORDS.with(|records| records.borrow_mut().push(line));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;
    static INIT: std::sync::Once = std::sync::Once::new();

    fn start_capture() {
        INIT.call_once(|| {
            // Only this module installs a logger in the unit test binary.
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Trace);
        });
        RECORDS.with(|records| records.borrow_mut().clear());
    }

    fn captured(level: log::Level) -> Vec<String> {
        RECORDS.with(|records| {
            records
                .borrow()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, line)| line.clone())
                .collect()
        })
    }

    #[test]
    fn test_first_failure_logged_in_full_later_condensed() {
        start_capture();
        let mut decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 8).unwrap();
        let bad = Document::new("text", "bad");
        decorated.perform_recognition(&bad).unwrap();
        decorated.perform_recognition(&bad).unwrap();

        let errors = captured(log::Level::Error);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            "Got an error from the annotator (recognizer) during Entity Recognition: \
             Annotation(\"recognizer failed on bad\")"
        );
        assert_eq!(
            errors[1],
            "Got an error from the annotator (recognizer): \
             Annotation failed: recognizer failed on bad"
        );
    }

    #[test]
    fn test_exceeding_tolerance_is_logged() {
        start_capture();
        let mut decorated =
            create_error_counting_decorator(ExperimentType::ERec, recognizer(), 4).unwrap();
        let bad = Document::new("text", "bad");
        decorated.perform_recognition(&bad).unwrap();
        assert!(decorated.perform_recognition(&bad).is_err());

        let errors = captured(log::Level::Error);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[2],
            "Annotator (recognizer) exceeded its error tolerance (2 > 1)"
        );
    }

    #[test]
    fn test_result_logging_switch() {
        let ok = Document::new("text", "ok");

        start_capture();
        let aspect = ErrorCounting::for_expected_calls(4, 0.25).unwrap();
        let mut decorated = create_decorator(ExperimentType::ERec, recognizer(), aspect).unwrap();
        decorated.perform_recognition(&ok).unwrap();
        let debug = captured(log::Level::Debug);
        assert_eq!(debug.len(), 1);
        assert!(debug[0].starts_with("[recognizer] Entity Recognition result="));

        start_capture();
        let aspect = ErrorCounting::for_expected_calls(4, 0.25)
            .unwrap()
            .with_result_logging(false);
        let mut decorated = create_decorator(ExperimentType::ERec, recognizer(), aspect).unwrap();
        decorated.perform_recognition(&ok).unwrap();
        assert!(captured(log::Level::Debug).is_empty());
    }
}
