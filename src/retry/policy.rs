//! Retry policy and backoff strategies

use crate::config::{as_object, lookup, read_integer, read_number, read_str};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Attempts made when none is configured
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const DEFAULT_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(DEFAULT_MAX_ATTEMPTS) {
    Some(attempts) => attempts,
    None => unreachable!(),
};

/// Base delay used when none is configured
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Mapping from a failed attempt number to the wait before the next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Always wait `base`
    #[default]
    Fixed,
    /// Wait `base × attempt`
    Linear,
    /// Wait `base × 2^(attempt - 1)`
    Exponential,
}

impl BackoffStrategy {
    /// Delay after the 1-based `attempt` failed. Saturates at `Duration::MAX`.
    pub fn delay(&self, attempt: u32, base: Duration) -> Duration {
        let attempt = attempt.max(1);
        match self {
            BackoffStrategy::Fixed => base,
            BackoffStrategy::Linear => base.saturating_mul(attempt),
            BackoffStrategy::Exponential => match 1u32.checked_shl(attempt - 1) {
                Some(factor) => base.saturating_mul(factor),
                None if base.is_zero() => Duration::ZERO,
                None => Duration::MAX,
            },
        }
    }

    /// Lowercase name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffStrategy::Fixed => "fixed",
            BackoffStrategy::Linear => "linear",
            BackoffStrategy::Exponential => "exponential",
        }
    }
}

impl fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fixed" => Ok(BackoffStrategy::Fixed),
            "linear" => Ok(BackoffStrategy::Linear),
            "exponential" => Ok(BackoffStrategy::Exponential),
            other => Err(Error::UnknownBackoffStrategy {
                name: other.to_string(),
            }),
        }
    }
}

/// Validated retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    base_delay: Duration,
    backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            backoff: BackoffStrategy::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Start building a policy from the defaults
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Build a policy from a JSON object such as
    /// `{"maxAttempts": 5, "baseDelay": 250, "backoffStrategy": "linear"}`
    ///
    /// `baseDelay` is in milliseconds. snake_case keys (`max_attempts`,
    /// `base_delay`, `backoff`) are accepted too. Missing keys keep their
    /// defaults.
    ///
    /// # Errors
    /// - [`Error::TypeError`] for a non-object or wrongly typed field
    /// - [`Error::InvalidMaxAttempts`], [`Error::InvalidBaseDelay`],
    ///   [`Error::UnknownBackoffStrategy`] for out-of-domain values
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = as_object("options", value)?;
        let mut builder = Self::builder();

        if let Some(raw) = lookup(object, &["maxAttempts", "max_attempts"]) {
            builder = builder.max_attempts(read_integer("maxAttempts", raw)?);
        }
        if let Some(raw) = lookup(object, &["baseDelay", "base_delay"]) {
            builder = builder.base_delay_ms(read_number("baseDelay", raw)?);
        }
        if let Some(raw) = lookup(object, &["backoffStrategy", "backoff"]) {
            builder = builder.backoff(read_str("backoffStrategy", raw)?.parse()?);
        }
        builder.build()
    }

    /// Total number of attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Delay unit fed to the backoff strategy
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Backoff strategy
    pub fn backoff(&self) -> BackoffStrategy {
        self.backoff
    }

    /// Wait after the 1-based `attempt` failed
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt, self.base_delay)
    }

    /// Every wait a fully failing run goes through, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts())
            .map(|attempt| self.delay_for(attempt))
            .collect()
    }
}

/// Builder for [`RetryPolicy`]; values are checked in [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_attempts: i64,
    base_delay: Duration,
    rejected_delay: Option<f64>,
    backoff: BackoffStrategy,
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self {
            max_attempts: i64::from(DEFAULT_MAX_ATTEMPTS),
            base_delay: DEFAULT_BASE_DELAY,
            rejected_delay: None,
            backoff: BackoffStrategy::Fixed,
        }
    }
}

impl RetryPolicyBuilder {
    /// Total attempts; must be at least 1
    pub fn max_attempts(mut self, max_attempts: i64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Base delay as a duration
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.rejected_delay = None;
        self
    }

    /// Base delay in milliseconds; must be finite and at least 0
    pub fn base_delay_ms(mut self, base_delay_ms: f64) -> Self {
        if !base_delay_ms.is_finite() || base_delay_ms < 0.0 {
            self.rejected_delay = Some(base_delay_ms);
            return self;
        }
        let nanos = (base_delay_ms * 1_000_000.0).round();
        self.base_delay = if nanos < u64::MAX as f64 {
            Duration::from_nanos(nanos as u64)
        } else {
            Duration::from_millis(base_delay_ms as u64)
        };
        self.rejected_delay = None;
        self
    }

    /// Backoff strategy
    pub fn backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Validate and produce the policy
    ///
    /// # Errors
    /// [`Error::InvalidMaxAttempts`] when `max_attempts < 1`,
    /// [`Error::InvalidBaseDelay`] when the delay is negative or not finite
    pub fn build(self) -> Result<RetryPolicy> {
        let invalid_attempts = Error::InvalidMaxAttempts {
            value: self.max_attempts,
        };
        if self.max_attempts < 1 {
            return Err(invalid_attempts);
        }
        if let Some(value) = self.rejected_delay {
            return Err(Error::InvalidBaseDelay { value });
        }

        let attempts = u32::try_from(self.max_attempts).unwrap_or(u32::MAX);
        let max_attempts = NonZeroU32::new(attempts).ok_or(invalid_attempts)?;

        Ok(RetryPolicy {
            max_attempts,
            base_delay: self.base_delay,
            backoff: self.backoff,
        })
    }
}
