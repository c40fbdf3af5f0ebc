//! Settings for running experiment tasks.

use crate::annotator::{max_errors_for, DEFAULT_TOLERATED_ERROR_FRACTION};
use crate::eval::Matching;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration of an experiment task.
///
/// Missing fields take their default when deserialized.
///
/// ```rust
/// use annobench::config::EvalConfig;
/// use annobench::eval::Matching;
///
/// let config = EvalConfig::from_json(r#"{ "matching": "StrongAnnotationMatch" }"#).unwrap();
/// assert_eq!(config.matching, Matching::StrongAnnotationMatch);
/// assert!((config.tolerated_error_fraction - 0.25).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Fraction of documents an engine may fail on before the task aborts.
    pub tolerated_error_fraction: f64,
    /// How produced and gold positions are compared.
    pub matching: Matching,
    /// Write every engine result to the debug log.
    pub log_results: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            tolerated_error_fraction: DEFAULT_TOLERATED_ERROR_FRACTION,
            matching: Matching::default(),
            log_results: true,
        }
    }
}

impl EvalConfig {
    /// Exact positions, and the first engine failure aborts the task.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            tolerated_error_fraction: 0.0,
            matching: Matching::StrongAnnotationMatch,
            log_results: true,
        }
    }

    /// With a different error tolerance.
    #[must_use]
    pub fn with_tolerated_error_fraction(mut self, fraction: f64) -> Self {
        self.tolerated_error_fraction = fraction;
        self
    }

    /// With a different matching policy.
    #[must_use]
    pub fn with_matching(mut self, matching: Matching) -> Self {
        self.matching = matching;
        self
    }

    /// With result logging switched on or off.
    #[must_use]
    pub fn with_log_results(mut self, enabled: bool) -> Self {
        self.log_results = enabled;
        self
    }

    /// Check the values.
    pub fn validate(&self) -> Result<()> {
        max_errors_for(0, self.tolerated_error_fraction).map(|_| ())
    }

    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(|e| match e {
            Error::Configuration(msg) => Error::configuration(format!("invalid config: {msg}")),
            other => other,
        })?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert!((config.tolerated_error_fraction - 0.25).abs() < 1e-9);
        assert_eq!(config.matching, Matching::WeakAnnotationMatch);
        assert!(config.log_results);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EvalConfig::default()
            .with_tolerated_error_fraction(0.1)
            .with_matching(Matching::ProportionalOverlap)
            .with_log_results(false);
        assert!((config.tolerated_error_fraction - 0.1).abs() < 1e-9);
        assert_eq!(config.matching, Matching::ProportionalOverlap);
        assert!(!config.log_results);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EvalConfig::from_json(r#"{ "log_results": false }"#).unwrap();
        assert!(!config.log_results);
        assert_eq!(config.matching, Matching::WeakAnnotationMatch);
    }

    #[test]
    fn test_from_json_rejects_bad_fraction() {
        let err = EvalConfig::from_json(r#"{ "tolerated_error_fraction": 1.5 }"#).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = EvalConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EvalConfig::strict();
        let back = EvalConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
