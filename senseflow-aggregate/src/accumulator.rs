// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::entry::AccumulatorEntry;
use crate::flush_policy::FlushPolicy;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use senseflow_core::{AggregateRecord, FlushReason, Reading, Result, SenseflowError, SourceId};
use std::collections::BTreeMap;

/// Per-source running sums for a fixed set of sources.
///
/// The source set is fixed at construction, so the map itself is never mutated
/// afterwards; each entry sits behind its own lock. A single consumer pays one
/// uncontended lock per reading, and several aggregation workers may share one
/// `Accumulator` without ever updating the same entry concurrently.
#[derive(Debug)]
pub struct Accumulator {
    entries: BTreeMap<SourceId, Mutex<AccumulatorEntry>>,
    policy: FlushPolicy,
}

impl Accumulator {
    /// Create empty entries for `sources`, with `created_at` as their initial
    /// last-record time. Duplicate ids collapse into one entry.
    pub fn new<I>(sources: I, policy: FlushPolicy, created_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = SourceId>,
    {
        let entries = sources
            .into_iter()
            .map(|source| (source, Mutex::new(AccumulatorEntry::new(created_at))))
            .collect();
        Self { entries, policy }
    }

    /// Add `value` to the batch for `source`.
    ///
    /// Returns the flushed record when this value completes the batch; the entry
    /// is then reset to an empty batch with `now` as its last-record time.
    ///
    /// # Errors
    /// Returns [`SenseflowError::UnknownSource`] if `source` was not configured.
    pub fn record(
        &self,
        source: &SourceId,
        value: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<AggregateRecord>> {
        let mut entry = self.entry(source)?.lock();
        entry.add(value, now);

        let flushed = self
            .policy
            .due(&entry, now)
            .map(|reason| entry.flush(source, now, reason));

        debug_assert!(entry.count() < self.policy.threshold());
        Ok(flushed)
    }

    /// [`record`](Self::record) for a whole reading.
    ///
    /// # Errors
    /// Returns [`SenseflowError::UnknownSource`] if the reading's source was not
    /// configured.
    pub fn record_reading(
        &self,
        reading: &Reading,
        now: DateTime<Utc>,
    ) -> Result<Option<AggregateRecord>> {
        self.record(reading.source(), reading.value(), now)
    }

    /// Flush every non-empty batch older than the policy's max age.
    ///
    /// Always empty for count-only policies.
    pub fn flush_stale(&self, now: DateTime<Utc>) -> Vec<AggregateRecord> {
        if self.policy.max_age().is_none() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter_map(|(source, entry)| {
                let mut entry = entry.lock();
                let reason = self.policy.due(&entry, now)?;
                Some(entry.flush(source, now, reason))
            })
            .collect()
    }

    /// Flush every non-empty batch regardless of policy, in source order.
    pub fn flush_all(&self, now: DateTime<Utc>) -> Vec<AggregateRecord> {
        self.entries
            .iter()
            .filter_map(|(source, entry)| {
                let mut entry = entry.lock();
                (entry.count() > 0).then(|| entry.flush(source, now, FlushReason::Shutdown))
            })
            .collect()
    }

    /// Copy of the current state for `source`.
    ///
    /// # Errors
    /// Returns [`SenseflowError::UnknownSource`] if `source` was not configured.
    pub fn snapshot(&self, source: &SourceId) -> Result<AccumulatorEntry> {
        Ok(self.entry(source)?.lock().clone())
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.entries.keys()
    }

    pub fn policy(&self) -> &FlushPolicy {
        &self.policy
    }

    fn entry(&self, source: &SourceId) -> Result<&Mutex<AccumulatorEntry>> {
        self.entries
            .get(source)
            .ok_or_else(|| SenseflowError::unknown_source(source.clone()))
    }
}
