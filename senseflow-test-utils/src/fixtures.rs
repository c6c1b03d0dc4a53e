// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, TimeZone, Utc};
use senseflow_core::{AggregateRecord, FlushReason, Reading, SourceId};

pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const MOTION: &str = "Motion";

/// 2025-06-01 08:00:00 UTC
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn sensor_ids() -> Vec<SourceId> {
    [TEMPERATURE, HUMIDITY, MOTION]
        .into_iter()
        .map(SourceId::new)
        .collect()
}

pub fn reading(source: &str, value: f64) -> Reading {
    Reading::new(SourceId::new(source), value, epoch())
}

pub fn reading_at(source: &str, value: f64, at: DateTime<Utc>) -> Reading {
    Reading::new(SourceId::new(source), value, at)
}

pub fn aggregate(source: &str, average: f64, count: u64) -> AggregateRecord {
    AggregateRecord {
        source: SourceId::new(source),
        average,
        count,
        flushed_at: epoch(),
        reason: FlushReason::Threshold,
    }
}
