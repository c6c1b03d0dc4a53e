// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::sink::Sink;
use senseflow_core::{AggregateRecord, Reading, Result, SenseflowError};
use std::sync::Arc;

/// Forwards every notification to each inner sink, in order.
///
/// A failing sink does not stop delivery to the ones after it.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for FanoutSink {
    fn notify_reading(&self, reading: &Reading) {
        for sink in &self.sinks {
            sink.notify_reading(reading);
        }
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        let failures: Vec<String> = self
            .sinks
            .iter()
            .filter_map(|sink| sink.notify_aggregate(record).err())
            .map(|error| error.to_string())
            .collect();

        if failures.is_empty() {
            return Ok(());
        }
        Err(SenseflowError::sink_error(format!(
            "{} of {} sinks failed: {}",
            failures.len(),
            self.sinks.len(),
            failures.join("; ")
        )))
    }
}
