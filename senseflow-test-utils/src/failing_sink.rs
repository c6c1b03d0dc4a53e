// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use senseflow_core::{AggregateRecord, Reading, Result, SenseflowError};
use senseflow_sink::Sink;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rejects every aggregate with a sink error; ignores readings.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn notify_reading(&self, _reading: &Reading) {}

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SenseflowError::sink_error(format!(
            "refusing aggregate for {}",
            record.source
        )))
    }
}
