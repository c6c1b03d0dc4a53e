// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the senseflow workspace.
//!
//! Development and testing only:
//!
//! - [`MemorySink`] - records every reading and aggregate for later assertions
//! - [`GatedSink`] - blocks `notify_aggregate` (and optionally `notify_reading`)
//!   until the test opens the gate
//! - [`FailingSink`] - rejects every aggregate
//! - [`ScriptedGenerator`] - replays a fixed list of values
//! - [`fixtures`] - readings and sources with fixed timestamps
//! - [`wait_until`] - polls a condition with a deadline

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod failing_sink;
pub mod fixtures;
pub mod gated_sink;
pub mod helpers;
pub mod memory_sink;
pub mod scripted_generator;

pub use failing_sink::FailingSink;
pub use gated_sink::GatedSink;
pub use helpers::wait_until;
pub use memory_sink::MemorySink;
pub use scripted_generator::ScriptedGenerator;
