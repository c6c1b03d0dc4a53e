// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::entry::AccumulatorEntry;
use chrono::{DateTime, TimeDelta, Utc};
use senseflow_core::{FlushReason, Result, SenseflowError};
use std::time::Duration;

/// When a batch is complete.
///
/// A batch always flushes once its count reaches `threshold` (checked with `>=`,
/// so a count that skips past the exact threshold still flushes). With a
/// `max_age`, a batch whose first value arrived at least `max_age` ago is
/// flushed as well. Idle time before that first value does not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    threshold: u64,
    max_age: Option<TimeDelta>,
}

impl FlushPolicy {
    /// Count-only policy.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if `threshold` is zero.
    pub fn count(threshold: u64) -> Result<Self> {
        if threshold == 0 {
            return Err(SenseflowError::config_error(
                "batch threshold must be at least 1",
            ));
        }
        Ok(Self {
            threshold,
            max_age: None,
        })
    }

    /// Add an age bound on top of the count threshold.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if `max_age` is zero or too large
    /// to represent.
    pub fn with_max_age(self, max_age: Duration) -> Result<Self> {
        if max_age.is_zero() {
            return Err(SenseflowError::config_error(
                "max batch age must be greater than zero",
            ));
        }
        let max_age = TimeDelta::from_std(max_age).map_err(|_| {
            SenseflowError::config_error(format!("max batch age {max_age:?} is out of range"))
        })?;
        Ok(Self {
            max_age: Some(max_age),
            ..self
        })
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age.and_then(|age| age.to_std().ok())
    }

    /// Whether `entry` must be flushed at `now`, and why.
    pub fn due(&self, entry: &AccumulatorEntry, now: DateTime<Utc>) -> Option<FlushReason> {
        if entry.count() >= self.threshold {
            return Some(FlushReason::Threshold);
        }
        self.is_stale(entry, now).then_some(FlushReason::Age)
    }

    fn is_stale(&self, entry: &AccumulatorEntry, now: DateTime<Utc>) -> bool {
        match (self.max_age, entry.opened_at()) {
            (Some(max_age), Some(opened_at)) => now.signed_duration_since(opened_at) >= max_age,
            _ => false,
        }
    }
}
