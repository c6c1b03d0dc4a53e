// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal output for readings and averages

use crate::format::local_timestamp;
use crate::sink::Sink;
use parking_lot::Mutex;
use senseflow_core::{AggregateRecord, Reading, Result, ResultExt};
use std::io::{self, Stdout, Write};

const GREEN: &str = "\x1B[32m";
const RESET: &str = "\x1B[0m";

/// Writes `[time] source: value` for every reading and
/// `[time] AVERAGE source: avg (n samples)` for every aggregate.
///
/// Readings are green when color is enabled; averages use the default color.
pub struct ConsoleSink<W = Stdout> {
    out: Mutex<W>,
    color: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            color: true,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        out.flush()
    }
}

impl<W: Write + Send> Sink for ConsoleSink<W> {
    fn notify_reading(&self, reading: &Reading) {
        let line = format!(
            "[{}] {}: {:.2}",
            local_timestamp(reading.captured_at()),
            reading.source(),
            reading.value()
        );
        let line = if self.color {
            format!("{GREEN}{line}{RESET}")
        } else {
            line
        };

        if let Err(error) = self.write_line(&line) {
            tracing::warn!(source = %reading.source(), %error, "failed to display reading");
        }
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        let line = format!(
            "[{}] AVERAGE {}: {:.2} ({} samples)",
            local_timestamp(record.flushed_at),
            record.source,
            record.average,
            record.count
        );
        self.write_line(&line)
            .with_sink_context(|| format!("displaying average for {}", record.source))
    }
}
