// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Destinations for raw readings and flushed aggregates.
//!
//! Every sink serializes its own writes behind its own lock, independent of the
//! buffer and accumulator locks:
//!
//! - [`ConsoleSink`] - colored reading lines and average lines on a terminal
//! - [`CsvSink`] - one CSV row per aggregate, header written on creation
//! - [`TracingSink`] - readings and aggregates as `tracing` events
//! - [`FanoutSink`] - forwards to several sinks

pub mod console;
pub mod csv_sink;
pub mod fanout;
mod format;
pub mod sink;
pub mod tracing_sink;

pub use self::console::ConsoleSink;
pub use self::csv_sink::{CsvSink, CSV_HEADER};
pub use self::fanout::FanoutSink;
pub use self::sink::Sink;
pub use self::tracing_sink::TracingSink;
