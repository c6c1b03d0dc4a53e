// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The single task that turns buffered readings into aggregates

use crate::pacing::{pause, Pacing};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use senseflow_aggregate::Accumulator;
use senseflow_buffer::BoundedBuffer;
use senseflow_core::{AggregateRecord, CancellationToken, Reading, Result, SenseflowError};
use senseflow_sink::Sink;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// How long shutdown waits for a sink call that is already running
pub const SINK_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Totals accumulated by a consumer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Readings fed to the accumulator, drained ones included
    pub consumed: u64,
    /// Aggregates the sink accepted
    pub aggregates_emitted: u64,
    /// Aggregates the sink rejected, panicked on, or was still holding at shutdown
    pub sink_failures: u64,
}

/// Pops readings, feeds the [`Accumulator`] and forwards completed batches to the
/// sink.
///
/// Sink calls run on tokio's blocking pool so a slow sink never holds the buffer
/// lock or stalls the runtime. A sink that hangs keeps the consumer from popping,
/// and producers then wait on a full buffer until cancellation.
///
/// A call still running [`SINK_SHUTDOWN_GRACE`] after cancellation is abandoned,
/// not killed: its blocking-pool thread stays parked in the sink for as long as
/// the sink blocks. Dropping the runtime waits for that thread, so the owner of
/// the runtime should end it with `Runtime::shutdown_timeout` or
/// `Runtime::shutdown_background` instead.
#[derive(Debug)]
pub struct Consumer {
    accumulator: Arc<Accumulator>,
    pacing: Pacing,
    rng: StdRng,
    drain_on_shutdown: bool,
    flush_partial_on_shutdown: bool,
}

impl Consumer {
    pub fn new(accumulator: Arc<Accumulator>, pacing: Pacing) -> Self {
        Self {
            accumulator,
            pacing,
            rng: StdRng::from_os_rng(),
            drain_on_shutdown: true,
            flush_partial_on_shutdown: false,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn drain_on_shutdown(mut self, drain: bool) -> Self {
        self.drain_on_shutdown = drain;
        self
    }

    #[must_use]
    pub fn flush_partial_on_shutdown(mut self, flush: bool) -> Self {
        self.flush_partial_on_shutdown = flush;
        self
    }

    /// Run until `cancel` fires, then shut down.
    ///
    /// Shutdown with draining enabled waits for the buffer to be
    /// [closed](BoundedBuffer::close), so whoever cancels must also close the
    /// buffer once producers have stopped. Every reading still buffered is then
    /// accumulated, and partial batches are flushed if configured.
    ///
    /// # Errors
    /// Returns [`SenseflowError::UnknownSource`] when a reading names a source the
    /// accumulator does not know. `cancel` is fired first so the rest of the
    /// pipeline stops too.
    pub async fn run(
        mut self,
        buffer: Arc<BoundedBuffer<Reading>>,
        sink: Arc<dyn Sink>,
        cancel: CancellationToken,
    ) -> Result<ConsumerReport> {
        let mut report = ConsumerReport::default();
        crate::debug!("consumer started");

        let live = self.consume_live(&buffer, &sink, &cancel, &mut report).await;
        let shutdown = match live {
            Ok(()) => self.shut_down(&buffer, &sink, &mut report).await,
            Err(error) => Err(error),
        };
        if let Err(error) = shutdown {
            crate::error!("consumer failed: {}", error);
            cancel.cancel();
            return Err(error);
        }

        crate::debug!(
            "consumer stopped: {} consumed, {} aggregates, {} sink failures",
            report.consumed,
            report.aggregates_emitted,
            report.sink_failures
        );
        Ok(report)
    }

    async fn consume_live(
        &mut self,
        buffer: &BoundedBuffer<Reading>,
        sink: &Arc<dyn Sink>,
        cancel: &CancellationToken,
        report: &mut ConsumerReport,
    ) -> Result<()> {
        loop {
            let delay = self.pacing.next_delay(&mut self.rng);
            let reading = match pause(delay, cancel).await {
                Ok(()) => buffer.pop(cancel).await,
                Err(error) => Err(error),
            };
            let reading = match reading {
                Ok(reading) => reading,
                Err(error) if error.is_shutdown() => return Ok(()),
                Err(error) => return Err(error),
            };

            for record in self.consume(&reading, report)? {
                self.forward(record, sink, Some(cancel), report).await;
            }
        }
    }

    async fn shut_down(
        &self,
        buffer: &BoundedBuffer<Reading>,
        sink: &Arc<dyn Sink>,
        report: &mut ConsumerReport,
    ) -> Result<()> {
        if self.drain_on_shutdown {
            // Producers may still be finishing a push until the buffer is closed.
            buffer.closed().await;
            while let Some(reading) = buffer.try_pop() {
                for record in self.consume(&reading, report)? {
                    self.forward(record, sink, None, report).await;
                }
            }
        }

        if self.flush_partial_on_shutdown {
            for record in self.accumulator.flush_all(Utc::now()) {
                self.forward(record, sink, None, report).await;
            }
        }
        Ok(())
    }

    /// Accumulate one reading; returns the threshold flush, if any, followed by
    /// any batches that went stale meanwhile.
    fn consume(
        &self,
        reading: &Reading,
        report: &mut ConsumerReport,
    ) -> Result<Vec<AggregateRecord>> {
        let now = Utc::now();
        let flushed = self.accumulator.record_reading(reading, now)?;
        report.consumed += 1;

        let mut records: Vec<AggregateRecord> = flushed.into_iter().collect();
        records.extend(self.accumulator.flush_stale(now));
        Ok(records)
    }

    /// Hand `record` to the sink on the blocking pool.
    ///
    /// With `cancel`, a delivery still in flight when it fires gets
    /// [`SINK_SHUTDOWN_GRACE`] to finish; after that it is left running and
    /// counted as a failure.
    async fn forward(
        &self,
        record: AggregateRecord,
        sink: &Arc<dyn Sink>,
        cancel: Option<&CancellationToken>,
        report: &mut ConsumerReport,
    ) {
        let source = record.source.clone();
        let sink = Arc::clone(sink);
        let mut delivery = tokio::task::spawn_blocking(move || sink.notify_aggregate(&record));

        let outcome = match cancel {
            Some(cancel) => tokio::select! {
                biased;
                outcome = &mut delivery => outcome,
                () = cancel.cancelled() => match timeout(SINK_SHUTDOWN_GRACE, &mut delivery).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        crate::warn!("abandoning aggregate for {}: sink still busy at shutdown", source);
                        report.sink_failures += 1;
                        return;
                    }
                },
            },
            None => delivery.await,
        };

        match outcome {
            Ok(Ok(())) => report.aggregates_emitted += 1,
            Ok(Err(error)) => {
                crate::warn!("sink rejected aggregate for {}: {}", source, error);
                report.sink_failures += 1;
            }
            Err(join_error) => {
                let error = SenseflowError::task_error(format!("sink delivery: {join_error}"));
                crate::error!("aggregate for {} lost: {}", source, error);
                report.sink_failures += 1;
            }
        }
    }
}
