// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Senseflow
//!
//! A bounded producer/consumer pipeline for simulated sensor readings.
//!
//! ## Overview
//!
//! Every configured source runs as its own producer task, pushing timestamped
//! readings into one fixed-capacity buffer. A single consumer pops them, keeps a
//! running sum and count per source, and every `batch_threshold` readings emits
//! the batch average to a sink. Full buffers make producers wait; empty buffers
//! make the consumer wait. One cancellation token stops everything, after which
//! the buffer is drained.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use senseflow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::default();
//!     let sink = senseflow::default_sink(&config, true)?;
//!
//!     let mut pipeline = Pipeline::new(&config, sink)?;
//!     pipeline.start()?;
//!     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!     let report = pipeline.stop().await?;
//!     println!("{} aggregates", report.consumer.aggregates_emitted);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use tokio::runtime::Runtime;

pub use senseflow_aggregate::{Accumulator, AccumulatorEntry, FlushPolicy};
pub use senseflow_buffer::BoundedBuffer;
pub use senseflow_core::{
    AggregateRecord, CancellationToken, FlushReason, Reading, Result, SenseflowError, SourceId,
    SourceKind, ValueGenerator,
};
pub use senseflow_exec::{
    Consumer, ConsumerReport, Pacing, Pipeline, PipelineConfig, PipelineReport, Producer,
    ProducerReport, SimulatedSensor, SourceDescriptor, SINK_SHUTDOWN_GRACE,
};
pub use senseflow_sink::{ConsoleSink, CsvSink, FanoutSink, Sink, TracingSink, CSV_HEADER};

/// Prelude module for convenient imports
pub mod prelude {
    pub use senseflow_core::{CancellationToken, Reading, SenseflowError, SourceId, SourceKind};
    pub use senseflow_exec::{Pacing, Pipeline, PipelineConfig, SourceDescriptor};
    pub use senseflow_sink::Sink;
}

/// The standard output pair: a CSV file at [`PipelineConfig::csv_path`] plus
/// either the colored console or, when `console` is false, `tracing` events.
///
/// # Errors
/// Returns [`SenseflowError::SinkError`] if the CSV file cannot be created.
pub fn default_sink(config: &PipelineConfig, console: bool) -> Result<Arc<dyn Sink>> {
    let display: Arc<dyn Sink> = if console {
        Arc::new(ConsoleSink::stdout())
    } else {
        Arc::new(TracingSink)
    };
    let csv = CsvSink::create(&config.output_dir, &config.csv_file_name)?;
    Ok(Arc::new(FanoutSink::new().with(display).with(Arc::new(csv))))
}

/// Shut down the runtime a pipeline ran on without waiting on abandoned sink
/// calls.
///
/// A sink call that outlived [`SINK_SHUTDOWN_GRACE`] at shutdown still occupies a
/// blocking-pool thread, and dropping the runtime would wait for it forever. This
/// gives such calls one more grace period, then leaves their threads behind.
/// Call it after [`Pipeline::stop`] has returned.
pub fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(SINK_SHUTDOWN_GRACE);
}
