// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::sink::Sink;
use senseflow_core::{AggregateRecord, Reading, Result};

/// Emits readings at `DEBUG` and aggregates at `INFO` on the `senseflow::sink`
/// target. Used when console output is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn notify_reading(&self, reading: &Reading) {
        tracing::debug!(
            target: "senseflow::sink",
            source = %reading.source(),
            value = reading.value(),
            captured_at = %reading.captured_at(),
            "reading"
        );
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        tracing::info!(
            target: "senseflow::sink",
            source = %record.source,
            average = record.average,
            count = record.count,
            reason = %record.reason,
            flushed_at = %record.flushed_at,
            "aggregate"
        );
        Ok(())
    }
}
