// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sensor reading domain type

use crate::source::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped value from a source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    source: SourceId,
    value: f64,
    captured_at: DateTime<Utc>,
}

impl Reading {
    pub fn new(source: SourceId, value: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            source,
            value,
            captured_at,
        }
    }

    /// Reading stamped with the current wall-clock time
    pub fn now(source: SourceId, value: f64) -> Self {
        Self::new(source, value, Utc::now())
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
