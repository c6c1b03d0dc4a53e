// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rand::Rng;
use senseflow_core::{CancellationToken, Result, SenseflowError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a task waits between iterations.
///
/// ```json
/// { "mode": "uniform", "min_ms": 1000, "max_ms": 3000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pacing {
    /// Always `ms` milliseconds
    Fixed { ms: u64 },
    /// Uniformly drawn from `min_ms..=max_ms` on every iteration
    Uniform { min_ms: u64, max_ms: u64 },
}

impl Pacing {
    pub const fn fixed(ms: u64) -> Self {
        Self::Fixed { ms }
    }

    pub const fn uniform(min_ms: u64, max_ms: u64) -> Self {
        Self::Uniform { min_ms, max_ms }
    }

    /// No wait at all; tasks still yield to the scheduler
    pub const fn immediate() -> Self {
        Self::Fixed { ms: 0 }
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            Self::Fixed { ms } => Duration::from_millis(ms),
            Self::Uniform { min_ms, max_ms } if min_ms < max_ms => {
                Duration::from_millis(rng.random_range(min_ms..=max_ms))
            }
            Self::Uniform { min_ms, .. } => Duration::from_millis(min_ms),
        }
    }

    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] for an inverted uniform range.
    pub fn validate(&self, owner: &str) -> Result<()> {
        match *self {
            Self::Uniform { min_ms, max_ms } if min_ms > max_ms => {
                Err(SenseflowError::config_error(format!(
                    "{owner}: pacing range {min_ms}..={max_ms} ms is inverted"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Sleep for `delay` unless `cancel` fires first.
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    cancel.run_until_cancelled(tokio::time::sleep(delay)).await
}
