//! Latency measurement for annotation engines.
//!
//! Only completed calls are measured. A failing call is neither timed nor
//! counted; its error passes through untouched. Put an error counting
//! decorator inside this one if absorbed failures should be timed as well.

use super::decorator::{create_decorator, Aspect, CallOutcome, Decorated};
use super::{Annotator, Capability, ExperimentType};
use crate::eval::{EvaluationResult, EvaluationResultContainer};
use crate::Result;
use std::fmt;
use std::time::{Duration, Instant};

/// Name of the result leaf reporting the average latency.
pub const AVG_TIME_RESULT_NAME: &str = "avg millis/doc";

/// Time measuring aspect state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeMeasuring {
    time_sum: Duration,
    call_count: usize,
}

impl TimeMeasuring {
    /// Fresh counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the runtime of one completed call.
    pub fn add_call_runtime(&mut self, runtime: Duration) {
        self.time_sum += runtime;
        self.call_count += 1;
    }

    /// Average runtime per call in milliseconds, NaN if nothing was measured.
    #[must_use]
    pub fn average_runtime(&self) -> f64 {
        if self.call_count == 0 {
            return f64::NAN;
        }
        self.time_sum.as_nanos() as f64 / 1e6 / self.call_count as f64
    }

    /// Zero both counters.
    pub fn reset(&mut self) {
        self.time_sum = Duration::ZERO;
        self.call_count = 0;
    }

    /// Sum of measured runtimes.
    #[must_use]
    pub fn time_sum(&self) -> Duration {
        self.time_sum
    }

    /// Number of measured calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count
    }
}

impl Aspect for TimeMeasuring {
    fn apply<T, F>(&mut self, _annotator: &str, _capability: Capability, call: F) -> CallOutcome<Vec<T>>
    where
        T: fmt::Debug,
        F: FnOnce() -> Result<Vec<T>>,
    {
        let start = Instant::now();
        match call() {
            Ok(result) => {
                self.add_call_runtime(start.elapsed());
                CallOutcome::Completed(result)
            }
            Err(error) => CallOutcome::Failed(error),
        }
    }

    /// Emits nothing when no call completed, so "never ran" stays
    /// distinguishable from "ran in zero time".
    fn contribute(&self, results: &mut EvaluationResultContainer) -> Result<()> {
        if self.call_count > 0 {
            results.add(EvaluationResult::double(
                AVG_TIME_RESULT_NAME,
                self.average_runtime(),
            ))?;
        }
        Ok(())
    }
}

/// An engine wrapped with time measurement.
pub type TimeMeasuringAnnotator<A> = Decorated<A, TimeMeasuring>;

impl<A: Annotator> Decorated<A, TimeMeasuring> {
    /// Average runtime per call in milliseconds, NaN if nothing was measured.
    pub fn average_runtime(&self) -> f64 {
        self.aspect().average_runtime()
    }

    /// Zero the counters.
    pub fn reset(&mut self) {
        self.aspect_mut().reset();
    }
}

/// Wrap `engine` with time measurement.
pub fn create_time_measuring_decorator<A: Annotator>(
    experiment_type: ExperimentType,
    engine: A,
) -> Result<TimeMeasuringAnnotator<A>> {
    create_decorator(experiment_type, engine, TimeMeasuring::new())
}
