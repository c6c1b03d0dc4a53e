// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use senseflow_core::{AggregateRecord, Reading, Result, SourceId};
use senseflow_sink::Sink;

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    readings: Mutex<Vec<Reading>>,
    aggregates: Mutex<Vec<AggregateRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.readings.lock().clone()
    }

    pub fn aggregates(&self) -> Vec<AggregateRecord> {
        self.aggregates.lock().clone()
    }

    pub fn aggregate_count(&self) -> usize {
        self.aggregates.lock().len()
    }

    pub fn aggregates_for(&self, source: &SourceId) -> Vec<AggregateRecord> {
        self.aggregates
            .lock()
            .iter()
            .filter(|record| &record.source == source)
            .cloned()
            .collect()
    }
}

impl Sink for MemorySink {
    fn notify_reading(&self, reading: &Reading) {
        self.readings.lock().push(reading.clone());
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        self.aggregates.lock().push(record.clone());
        Ok(())
    }
}
