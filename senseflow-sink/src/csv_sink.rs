// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Flat-file persistence of aggregates
//!
//! Layout, one row per flush after a fixed header:
//!
//! ```text
//! Timestamp,SensorType,AverageValue,RecordCount
//! "2025-06-01 08:00:20","Temperature",27.31,10
//! ```

use crate::format::local_timestamp;
use crate::sink::Sink;
use csv::{QuoteStyle, Writer, WriterBuilder};
use parking_lot::Mutex;
use senseflow_core::{AggregateRecord, Reading, Result, ResultExt};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Timestamp,SensorType,AverageValue,RecordCount";

/// Appends one row per aggregate to a CSV file.
///
/// Creating the sink creates the parent directory if needed, truncates the file
/// and writes [`CSV_HEADER`]. Each row is flushed to disk before
/// `notify_aggregate` returns. Raw readings are not persisted.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<Writer<File>>,
}

impl CsvSink {
    /// Create `dir/file_name`, creating `dir` first if it does not exist.
    ///
    /// # Errors
    /// Returns [`SenseflowError::SinkError`](senseflow_core::SenseflowError::SinkError)
    /// if the directory or file cannot be created or the header cannot be written.
    pub fn create(dir: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_sink_context(|| format!("creating output directory {}", dir.display()))?;

        let path = dir.join(file_name);
        let mut file = File::create(&path)
            .with_sink_context(|| format!("creating {}", path.display()))?;
        // The header is unquoted; data rows quote their text fields.
        writeln!(file, "{CSV_HEADER}")
            .with_sink_context(|| format!("writing header to {}", path.display()))?;

        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::NonNumeric)
            .from_writer(file);

        tracing::debug!(path = %path.display(), "csv sink ready");
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for CsvSink {
    fn notify_reading(&self, _reading: &Reading) {}

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        let row = [
            local_timestamp(record.flushed_at),
            record.source.to_string(),
            format!("{:.2}", record.average),
            record.count.to_string(),
        ];

        let mut writer = self.writer.lock();
        writer
            .write_record(&row)
            .with_sink_context(|| format!("writing row to {}", self.path.display()))?;
        writer
            .flush()
            .with_sink_context(|| format!("flushing {}", self.path.display()))
    }
}
