// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lifecycle of the whole system: N producers, one consumer, one buffer

use crate::config::PipelineConfig;
use crate::consumer::{Consumer, ConsumerReport};
use crate::producer::{Producer, ProducerReport};
use chrono::Utc;
use senseflow_aggregate::Accumulator;
use senseflow_buffer::BoundedBuffer;
use senseflow_core::{CancellationToken, Reading, Result, SenseflowError};
use senseflow_sink::Sink;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Added to the configured seed so the consumer's pacing stream differs from
/// every producer's.
const CONSUMER_SEED_OFFSET: u64 = 0x5EED_C0DE;

/// Outcome of a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub producers: Vec<ProducerReport>,
    pub consumer: ConsumerReport,
}

impl PipelineReport {
    /// Readings all producers pushed into the buffer
    pub fn produced(&self) -> u64 {
        self.producers.iter().map(|report| report.produced).sum()
    }
}

pub struct Pipeline {
    cancel_token: CancellationToken,
    buffer: Arc<BoundedBuffer<Reading>>,
    accumulator: Arc<Accumulator>,
    sink: Arc<dyn Sink>,
    producers: Vec<Producer>,
    consumer: Option<Consumer>,
    producer_handles: Vec<JoinHandle<Result<ProducerReport>>>,
    consumer_handle: Option<JoinHandle<Result<ConsumerReport>>>,
    finished: Vec<ProducerReport>,
}

impl Pipeline {
    /// Build a pipeline with one simulated producer per configured source.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: &PipelineConfig, sink: Arc<dyn Sink>) -> Result<Self> {
        let producers = config
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
                Producer::simulated(source, seed)
            })
            .collect();
        Self::with_producers(config, producers, sink)
    }

    /// Build a pipeline around caller-supplied producers.
    ///
    /// The accumulator only knows the sources in `config`; a producer for any
    /// other source makes the consumer fail.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if the configuration is invalid.
    pub fn with_producers(
        config: &PipelineConfig,
        producers: Vec<Producer>,
        sink: Arc<dyn Sink>,
    ) -> Result<Self> {
        config.validate()?;

        let buffer = Arc::new(BoundedBuffer::new(config.buffer_capacity)?);
        let accumulator = Arc::new(Accumulator::new(
            config.source_ids().cloned(),
            config.flush_policy()?,
            Utc::now(),
        ));

        let mut consumer = Consumer::new(Arc::clone(&accumulator), config.consumer_pacing)
            .drain_on_shutdown(config.drain_on_shutdown)
            .flush_partial_on_shutdown(config.flush_partial_on_shutdown);
        if let Some(seed) = config.seed {
            consumer = consumer.with_seed(seed.wrapping_add(CONSUMER_SEED_OFFSET));
        }

        Ok(Self {
            cancel_token: CancellationToken::new(),
            buffer,
            accumulator,
            sink,
            producers,
            consumer: Some(consumer),
            producer_handles: Vec::new(),
            consumer_handle: None,
            finished: Vec::new(),
        })
    }

    /// Token shared by every task; cancelling it alone stops the tasks but leaves
    /// the final drain to [`stop`](Self::stop).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn buffer(&self) -> &Arc<BoundedBuffer<Reading>> {
        &self.buffer
    }

    pub fn accumulator(&self) -> &Arc<Accumulator> {
        &self.accumulator
    }

    pub fn is_started(&self) -> bool {
        self.consumer.is_none()
    }

    /// Spawn the consumer and every producer on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`SenseflowError::TaskError`] if the pipeline was already started.
    pub fn start(&mut self) -> Result<()> {
        let Some(consumer) = self.consumer.take() else {
            return Err(SenseflowError::task_error("pipeline already started"));
        };

        let buffer = Arc::clone(&self.buffer);
        let sink = Arc::clone(&self.sink);
        let cancel = self.cancel_token.clone();
        self.consumer_handle = Some(tokio::spawn(consumer.run(buffer, sink, cancel)));

        for producer in self.producers.drain(..) {
            let buffer = Arc::clone(&self.buffer);
            let sink = Arc::clone(&self.sink);
            let cancel = self.cancel_token.clone();
            self.producer_handles
                .push(tokio::spawn(producer.run(buffer, sink, cancel)));
        }

        crate::info!(
            "pipeline started: {} producers, buffer capacity {}, batch threshold {}",
            self.producer_handles.len(),
            self.buffer.capacity(),
            self.accumulator.policy().threshold()
        );
        Ok(())
    }

    /// Wait for every producer to finish on its own, which only happens when
    /// they all have a reading limit or the pipeline is cancelled.
    ///
    /// # Errors
    /// Returns the first producer failure.
    pub async fn wait_for_producers(&mut self) -> Result<()> {
        for handle in self.producer_handles.drain(..) {
            self.finished.push(join("producer", handle).await?);
        }
        Ok(())
    }

    /// Cancel every task, close the buffer once producers are done, and wait for
    /// the consumer to drain and exit.
    ///
    /// # Errors
    /// Returns the first task failure, after every task has been joined.
    pub async fn stop(mut self) -> Result<PipelineReport> {
        self.cancel_token.cancel();

        let mut first_error = None;
        let mut producers = std::mem::take(&mut self.finished);
        for handle in self.producer_handles.drain(..) {
            match join("producer", handle).await {
                Ok(report) => producers.push(report),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        self.buffer.close();

        let consumer = match self.consumer_handle.take() {
            Some(handle) => join("consumer", handle).await,
            None => Ok(ConsumerReport::default()),
        };
        let consumer = match (consumer, first_error) {
            (Ok(report), None) => report,
            (Err(error), _) | (Ok(_), Some(error)) => return Err(error),
        };

        let report = PipelineReport {
            producers,
            consumer,
        };
        crate::info!(
            "pipeline stopped: {} produced, {} consumed, {} aggregates, {} sink failures",
            report.produced(),
            report.consumer.consumed,
            report.consumer.aggregates_emitted,
            report.consumer.sink_failures
        );
        Ok(report)
    }
}

async fn join<T>(task: &str, handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| SenseflowError::task_error(format!("{task} task: {e}")))?
}
