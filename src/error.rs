//! Error types for taskbatch parameter validation
//!
//! Operational failures never pass through this type: a failing transform,
//! task or retried operation surfaces the caller's own error value.

use thiserror::Error;

/// Validation errors raised before any asynchronous work is scheduled
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Value has the wrong type
    ///
    /// **Triggered by:** loosely typed configuration holding a value of the wrong kind
    /// **Example:** `{"concurrency": "three"}`, `{"maxAttempts": 2.5}`
    #[error("Type error: {field} expected {expected}, got {got}")]
    TypeError {
        /// Configuration field being read
        field: String,
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Concurrency limit below one
    ///
    /// **Triggered by:** `concurrency = 0` or a negative limit
    #[error("concurrency must be at least 1, got {value}")]
    InvalidConcurrency {
        /// Rejected limit
        value: i64,
    },

    /// Retry attempt budget below one
    #[error("maxAttempts must be at least 1, got {value}")]
    InvalidMaxAttempts {
        /// Rejected attempt count
        value: i64,
    },

    /// Negative base delay between retries
    #[error("baseDelay must be at least 0, got {value}")]
    InvalidBaseDelay {
        /// Rejected delay in milliseconds
        value: f64,
    },

    /// Backoff strategy name not recognized
    #[error("Unknown backoff strategy: {name} (expected fixed, linear or exponential)")]
    UnknownBackoffStrategy {
        /// Rejected name
        name: String,
    },

    /// Admission mode name not recognized
    #[error("Unknown admission mode: {name} (expected chunked or window)")]
    UnknownAdmissionMode {
        /// Rejected name
        name: String,
    },
}

/// Which validation tier an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong static type for a parameter
    Type,
    /// Right type, value outside its valid domain
    Value,
}

impl Error {
    /// Create a type error for a configuration field
    pub fn type_error(
        field: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Error::TypeError {
            field: field.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Classify the error into its validation tier
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TypeError { .. } => ErrorKind::Type,
            Error::InvalidConcurrency { .. }
            | Error::InvalidMaxAttempts { .. }
            | Error::InvalidBaseDelay { .. }
            | Error::UnknownBackoffStrategy { .. }
            | Error::UnknownAdmissionMode { .. } => ErrorKind::Value,
        }
    }
}

/// Result type for taskbatch validation
pub type Result<T> = std::result::Result<T, Error>;
