// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use senseflow_core::{AggregateRecord, Reading, Result};
use std::sync::Arc;

/// Receiver of raw readings and flushed aggregates.
///
/// Implementations are shared by every producer and the consumer, so they take
/// `&self` and serialize their own output.
///
/// Both methods may block on I/O. Producers and the consumer call them on tokio's
/// blocking pool and never while holding the buffer lock.
pub trait Sink: Send + Sync {
    /// Display or log a raw reading. Best-effort: failures are handled inside the
    /// sink and never reach the producer.
    fn notify_reading(&self, reading: &Reading);

    /// Persist or log a flushed aggregate.
    ///
    /// # Errors
    /// Returns [`SenseflowError::SinkError`](senseflow_core::SenseflowError::SinkError)
    /// if the record could not be written. The caller logs it and carries on.
    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn notify_reading(&self, reading: &Reading) {
        (**self).notify_reading(reading);
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        (**self).notify_aggregate(record)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn notify_reading(&self, reading: &Reading) {
        (**self).notify_reading(reading);
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        (**self).notify_aggregate(record)
    }
}
