// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Aggregate record domain type

use crate::source::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a batch was flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushReason {
    /// The batch reached the configured count threshold
    Threshold,
    /// The batch outlived the configured maximum age
    Age,
    /// The pipeline shut down with a partial batch
    Shutdown,
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Threshold => "threshold",
            Self::Age => "age",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Snapshot of one flushed batch for a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub source: SourceId,
    pub average: f64,
    pub count: u64,
    pub flushed_at: DateTime<Utc>,
    pub reason: FlushReason,
}

impl AggregateRecord {
    /// Build a record from a batch's running sum and count.
    ///
    /// `count` must be non-zero; the accumulator never flushes an empty batch.
    pub fn from_batch(
        source: SourceId,
        sum: f64,
        count: u64,
        flushed_at: DateTime<Utc>,
        reason: FlushReason,
    ) -> Self {
        debug_assert!(count > 0, "flushing an empty batch for {source}");
        Self {
            source,
            average: sum / count as f64,
            count,
            flushed_at,
            reason,
        }
    }
}
