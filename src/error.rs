//! Error types for annobench.

use crate::annotator::Capability;
use thiserror::Error;

/// Result type for annobench operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annobench operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A single call into an annotation engine failed.
    ///
    /// The resilience decorator tolerates these up to its threshold.
    #[error("Annotation failed: {0}")]
    Annotation(String),

    /// More engine calls failed than the tolerance threshold allows.
    #[error("Saw too many errors (maximum was set to {max_errors}, got {error_count})")]
    TooManySingleErrors {
        /// Threshold computed when the decorator was created.
        max_errors: usize,
        /// Failures observed when the threshold was exceeded.
        error_count: usize,
    },

    /// Missing or invalid setup, detected before any document is processed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The annotator (or its decorator) does not expose the capability.
    #[error("Annotator {annotator} does not support {capability:?}")]
    UnsupportedCapability {
        /// Name of the annotator that was called.
        annotator: String,
        /// Capability that was requested.
        capability: Capability,
    },

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Evaluation error.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Coarse classification used by task schedulers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// One call failed; recoverable by substituting an empty result.
    Tolerated,
    /// The task must be abandoned.
    Fatal,
    /// Setup problem, raised before processing starts.
    Configuration,
    /// Caller passed malformed input.
    Input,
}

impl Error {
    /// Create an annotation (invocation) error.
    pub fn annotation(msg: impl Into<String>) -> Self {
        Error::Annotation(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create an unsupported capability error.
    pub fn unsupported(annotator: impl Into<String>, capability: Capability) -> Self {
        Error::UnsupportedCapability {
            annotator: annotator.into(),
            capability,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an evaluation error.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Annotation(_) => ErrorKind::Tolerated,
            Error::TooManySingleErrors { .. } | Error::Evaluation(_) => ErrorKind::Fatal,
            Error::Configuration(_) | Error::UnsupportedCapability { .. } => {
                ErrorKind::Configuration
            }
            Error::InvalidInput(_) | Error::Parse(_) => ErrorKind::Input,
        }
    }

    /// Whether this error terminates the enclosing task.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Fatal | ErrorKind::Configuration)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
