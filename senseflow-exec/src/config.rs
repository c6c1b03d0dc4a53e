// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pipeline configuration
//!
//! Every field has a default reproducing the classic three-sensor simulator, so an
//! empty JSON object is a valid configuration:
//!
//! ```
//! use senseflow_exec::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str("{}").unwrap();
//! assert_eq!(config.buffer_capacity, 10);
//! assert_eq!(config.sources.len(), 3);
//! ```

use crate::pacing::Pacing;
use senseflow_aggregate::FlushPolicy;
use senseflow_core::{Result, SenseflowError, SourceId, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PRODUCER_PACING: Pacing = Pacing::uniform(1_000, 3_000);
const DEFAULT_CONSUMER_PACING: Pacing = Pacing::fixed(2_000);

/// One producer: what it is called, what it measures and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: SourceId,
    #[serde(flatten)]
    pub kind: SourceKind,
    #[serde(default = "default_producer_pacing")]
    pub pacing: Pacing,
    /// Stop after this many readings; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<SourceId>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            pacing: DEFAULT_PRODUCER_PACING,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn default_producer_pacing() -> Pacing {
    DEFAULT_PRODUCER_PACING
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Slots in the shared reading buffer
    pub buffer_capacity: usize,
    /// Readings per source that complete a batch
    pub batch_threshold: u64,
    /// Flush a non-empty batch once it has been open this long
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batch_age_ms: Option<u64>,
    pub consumer_pacing: Pacing,
    /// Feed readings still buffered at shutdown to the accumulator
    pub drain_on_shutdown: bool,
    /// Emit partial batches at shutdown
    pub flush_partial_on_shutdown: bool,
    /// Seed for value and pacing randomness; fresh entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub csv_file_name: String,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 10,
            batch_threshold: 10,
            max_batch_age_ms: None,
            consumer_pacing: DEFAULT_CONSUMER_PACING,
            drain_on_shutdown: true,
            flush_partial_on_shutdown: false,
            seed: None,
            output_dir: PathBuf::from("sensor_data"),
            csv_file_name: "sensor_averages.csv".to_owned(),
            sources: vec![
                SourceDescriptor::new("Temperature", SourceKind::Temperature),
                SourceDescriptor::new("Humidity", SourceKind::Humidity),
                SourceDescriptor::new("Motion", SourceKind::Motion),
            ],
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if the document is malformed or
    /// fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SenseflowError::config_error(format!("malformed configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if the file cannot be read, is
    /// malformed, or fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            SenseflowError::config_error(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(SenseflowError::config_error(
                "buffer_capacity must be at least 1",
            ));
        }
        if self.batch_threshold == 0 {
            return Err(SenseflowError::config_error(
                "batch_threshold must be at least 1",
            ));
        }
        if self.max_batch_age_ms == Some(0) {
            return Err(SenseflowError::config_error(
                "max_batch_age_ms must be greater than zero",
            ));
        }
        if self.csv_file_name.trim().is_empty() {
            return Err(SenseflowError::config_error("csv_file_name is empty"));
        }
        self.consumer_pacing.validate("consumer")?;

        if self.sources.is_empty() {
            return Err(SenseflowError::config_error("no sources configured"));
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.as_str().trim().is_empty() {
                return Err(SenseflowError::config_error("source id is empty"));
            }
            if !seen.insert(&source.id) {
                return Err(SenseflowError::config_error(format!(
                    "duplicate source id {}",
                    source.id
                )));
            }
            source.pacing.validate(source.id.as_str())?;
            if let SourceKind::Uniform { min, max } = source.kind {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(SenseflowError::config_error(format!(
                        "{}: value range {min}..{max} is invalid",
                        source.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn max_batch_age(&self) -> Option<Duration> {
        self.max_batch_age_ms.map(Duration::from_millis)
    }

    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] for a zero threshold or age.
    pub fn flush_policy(&self) -> Result<FlushPolicy> {
        let policy = FlushPolicy::count(self.batch_threshold)?;
        match self.max_batch_age() {
            Some(age) => policy.with_max_age(age),
            None => Ok(policy),
        }
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.iter().map(|source| &source.id)
    }

    /// Where the CSV sink writes
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file_name)
    }
}
