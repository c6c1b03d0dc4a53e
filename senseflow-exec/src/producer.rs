// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One task per source: pace, generate, display, enqueue

use crate::config::SourceDescriptor;
use crate::pacing::{pause, Pacing};
use crate::simulated::SimulatedSensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use senseflow_buffer::BoundedBuffer;
use senseflow_core::{CancellationToken, Reading, Result, SourceId, ValueGenerator};
use senseflow_sink::Sink;
use std::fmt;
use std::sync::Arc;

/// What a producer did before it stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerReport {
    pub source: SourceId,
    /// Readings that made it into the buffer
    pub produced: u64,
}

pub struct Producer {
    source: SourceId,
    generator: Box<dyn ValueGenerator>,
    pacing: Pacing,
    rng: StdRng,
    limit: Option<u64>,
}

impl Producer {
    pub fn new(
        source: impl Into<SourceId>,
        generator: impl ValueGenerator + 'static,
        pacing: Pacing,
    ) -> Self {
        Self {
            source: source.into(),
            generator: Box::new(generator),
            pacing,
            rng: StdRng::from_os_rng(),
            limit: None,
        }
    }

    /// Producer backed by a [`SimulatedSensor`] of the descriptor's kind.
    ///
    /// With a seed, the value and pacing streams are both reproducible.
    pub fn simulated(descriptor: &SourceDescriptor, seed: Option<u64>) -> Self {
        let sensor = match seed {
            Some(seed) => SimulatedSensor::seeded(descriptor.kind, seed),
            None => SimulatedSensor::new(descriptor.kind),
        };
        let mut producer = Self::new(descriptor.id.clone(), sensor, descriptor.pacing);
        if let Some(seed) = seed {
            producer.rng = StdRng::seed_from_u64(seed.rotate_left(32));
        }
        producer.limit = descriptor.limit;
        producer
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Run until `cancel` fires, the buffer is closed, or the reading limit is
    /// reached.
    ///
    /// Cancellation and closing are a normal stop and yield the report.
    ///
    /// # Errors
    /// Only non-shutdown errors from the buffer are returned.
    pub async fn run(
        mut self,
        buffer: Arc<BoundedBuffer<Reading>>,
        sink: Arc<dyn Sink>,
        cancel: CancellationToken,
    ) -> Result<ProducerReport> {
        let mut produced = 0u64;
        crate::debug!("producer {} started", self.source);

        let outcome = loop {
            if self.limit.is_some_and(|limit| produced >= limit) {
                break Ok(());
            }
            let delay = self.pacing.next_delay(&mut self.rng);
            if let Err(error) = pause(delay, &cancel).await {
                break Err(error);
            }

            let reading = Reading::now(self.source.clone(), self.generator.next_value());
            if let Err(error) = display(&reading, &sink, &cancel).await {
                break Err(error);
            }
            if let Err(error) = buffer.push(reading, &cancel).await {
                break Err(error);
            }
            produced += 1;
        };

        crate::debug!("producer {} stopped after {} readings", self.source, produced);
        match outcome {
            Err(error) if !error.is_shutdown() => Err(error),
            _ => Ok(ProducerReport {
                source: self.source,
                produced,
            }),
        }
    }
}

/// Hand `reading` to the sink on the blocking pool.
///
/// Display is best-effort: a panicking sink is logged and the reading is still
/// enqueued. A display call still running when `cancel` fires is abandoned.
async fn display(reading: &Reading, sink: &Arc<dyn Sink>, cancel: &CancellationToken) -> Result<()> {
    let sink = Arc::clone(sink);
    let shown = reading.clone();
    let display = tokio::task::spawn_blocking(move || sink.notify_reading(&shown));

    if let Err(join_error) = cancel.run_until_cancelled(display).await? {
        crate::warn!("could not display a reading from {}: {}", reading.source(), join_error);
    }
    Ok(())
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("source", &self.source)
            .field("pacing", &self.pacing)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
