// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Task execution for senseflow.
//!
//! A [`Pipeline`] owns one [`BoundedBuffer`](senseflow_buffer::BoundedBuffer) of
//! readings, one [`Accumulator`](senseflow_aggregate::Accumulator) and one sink,
//! and runs a [`Producer`] per configured source plus a single [`Consumer`] on the
//! tokio runtime. A shared cancellation token stops them all; [`Pipeline::stop`]
//! then drains what is left and returns a [`PipelineReport`].
//!
//! Logging goes through `tracing` with the default `tracing` feature and falls
//! back to standard output without it.

#![allow(clippy::multiple_crate_versions)]

mod logging;

pub mod config;
pub mod consumer;
pub mod pacing;
pub mod pipeline;
pub mod producer;
pub mod simulated;

pub use config::{PipelineConfig, SourceDescriptor};
pub use consumer::{Consumer, ConsumerReport, SINK_SHUTDOWN_GRACE};
pub use pacing::Pacing;
pub use pipeline::{Pipeline, PipelineReport};
pub use producer::{Producer, ProducerReport};
pub use simulated::SimulatedSensor;
