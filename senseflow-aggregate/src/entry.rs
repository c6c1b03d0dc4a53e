// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, Utc};
use senseflow_core::{AggregateRecord, FlushReason, SourceId};

/// Running batch state for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorEntry {
    sum: f64,
    count: u64,
    last_record_time: DateTime<Utc>,
    opened_at: Option<DateTime<Utc>>,
}

impl AccumulatorEntry {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            last_record_time: created_at,
            opened_at: None,
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Time of the last flush, or of creation if nothing was flushed yet
    pub fn last_record_time(&self) -> DateTime<Utc> {
        self.last_record_time
    }

    /// When the first value of the current batch arrived; `None` while empty
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// Average of the current partial batch
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub(crate) fn add(&mut self, value: f64, now: DateTime<Utc>) {
        if self.count == 0 {
            self.opened_at = Some(now);
        }
        self.sum += value;
        self.count += 1;
    }

    /// Close the current batch into a record and start a new one at `now`.
    pub(crate) fn flush(
        &mut self,
        source: &SourceId,
        now: DateTime<Utc>,
        reason: FlushReason,
    ) -> AggregateRecord {
        let record = AggregateRecord::from_batch(source.clone(), self.sum, self.count, now, reason);
        self.sum = 0.0;
        self.count = 0;
        self.last_record_time = now;
        self.opened_at = None;
        record
    }
}
