// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Batch accounting for the consumer side of the pipeline.
//!
//! The [`Accumulator`] keeps one running sum/count per configured source and turns
//! a batch into an [`AggregateRecord`](senseflow_core::AggregateRecord) once the
//! [`FlushPolicy`] says it is complete. It performs no I/O and never blocks beyond
//! a per-source lock.

pub mod accumulator;
pub mod entry;
pub mod flush_policy;

pub use self::accumulator::Accumulator;
pub use self::entry::AccumulatorEntry;
pub use self::flush_policy::FlushPolicy;
