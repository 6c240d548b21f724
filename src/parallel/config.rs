//! Concurrency configuration shared by the bounded executors

use crate::config::{as_object, lookup, read_integer, read_str};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Concurrency limit used when none is supplied
pub const DEFAULT_CONCURRENCY: usize = 5;

const DEFAULT_LIMIT: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CONCURRENCY) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// How new work is admitted once the limit is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionMode {
    /// Dispatch fixed-size chunks; the next chunk starts once the whole
    /// current chunk has settled
    #[default]
    Chunked,
    /// Keep the window full: admit the next item as soon as any in-flight
    /// item settles
    Window,
}

impl AdmissionMode {
    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionMode::Chunked => "chunked",
            AdmissionMode::Window => "window",
        }
    }
}

impl fmt::Display for AdmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chunked" => Ok(AdmissionMode::Chunked),
            "window" => Ok(AdmissionMode::Window),
            other => Err(Error::UnknownAdmissionMode {
                name: other.to_string(),
            }),
        }
    }
}

/// Configuration for bounded execution
///
/// A constructed config is always valid: the limit is at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutorConfig {
    concurrency: NonZeroUsize,
    mode: AdmissionMode,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_LIMIT,
            mode: AdmissionMode::Chunked,
        }
    }
}

impl ExecutorConfig {
    /// Validate a concurrency limit
    ///
    /// # Errors
    /// [`Error::InvalidConcurrency`] when `concurrency < 1`
    pub fn new(concurrency: i64) -> Result<Self> {
        let limit = usize::try_from(concurrency)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(Error::InvalidConcurrency { value: concurrency })?;
        Ok(Self {
            concurrency: limit,
            mode: AdmissionMode::Chunked,
        })
    }

    /// Validate an optional limit, falling back to [`DEFAULT_CONCURRENCY`]
    pub fn from_option(concurrency: Option<i64>) -> Result<Self> {
        match concurrency {
            Some(n) => Self::new(n),
            None => Ok(Self::default()),
        }
    }

    /// Build a config from a JSON object such as
    /// `{"concurrency": 3, "mode": "window"}`. Both keys are optional.
    ///
    /// # Errors
    /// - [`Error::TypeError`] when the value is not an object, the limit is
    ///   not an integer or the mode is not a string
    /// - [`Error::InvalidConcurrency`] / [`Error::UnknownAdmissionMode`] for
    ///   out-of-domain values
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = as_object("options", value)?;

        let mut config = match lookup(object, &["concurrency"]) {
            Some(raw) => Self::new(read_integer("concurrency", raw)?)?,
            None => Self::default(),
        };
        if let Some(raw) = lookup(object, &["mode"]) {
            config.mode = read_str("mode", raw)?.parse()?;
        }
        Ok(config)
    }

    /// Switch admission mode
    pub fn with_mode(mut self, mode: AdmissionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Maximum number of in-flight items
    pub fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    /// Admission mode
    pub fn mode(&self) -> AdmissionMode {
        self.mode
    }
}
