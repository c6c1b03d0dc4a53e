// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core types shared by every senseflow crate.
//!
//! - [`Reading`] - one timestamped value produced by a source
//! - [`AggregateRecord`] - a flushed per-source batch summary
//! - [`SourceId`] / [`SourceKind`] - source identity and simulated value policy
//! - [`CancellationToken`] - shutdown signal observed at every suspension point
//! - [`SenseflowError`] - root error type

pub mod aggregate_record;
pub mod cancellation_token;
pub mod error;
pub mod reading;
pub mod source;
pub mod value_generator;

pub use self::aggregate_record::{AggregateRecord, FlushReason};
pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::error::{Result, ResultExt, SenseflowError};
pub use self::reading::Reading;
pub use self::source::{SourceId, SourceKind};
pub use self::value_generator::ValueGenerator;
