// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use senseflow_aggregate::{Accumulator, FlushPolicy};
use senseflow_core::{FlushReason, SenseflowError, SourceId};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn sensors() -> Vec<SourceId> {
    ["Temperature", "Humidity", "Motion"]
        .into_iter()
        .map(SourceId::new)
        .collect()
}

#[test]
fn test_zero_threshold_is_rejected() {
    assert!(matches!(
        FlushPolicy::count(0),
        Err(SenseflowError::InvalidConfig { .. })
    ));
}

#[test]
fn test_threshold_flush_exactness() {
    // Arrange
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(10).unwrap(), t0());
    let temperature = SourceId::new("Temperature");
    let values: Vec<f64> = (1..=10).map(|n| 20.0 + f64::from(n) / 10.0).collect();
    let flushed_at = t0() + TimeDelta::seconds(30);

    // Act
    let mut results = Vec::new();
    for (n, value) in values.iter().enumerate() {
        let now = if n == 9 { flushed_at } else { t0() };
        results.push(accumulator.record(&temperature, *value, now).unwrap());
    }

    // Assert
    assert!(results[..9].iter().all(Option::is_none));
    let record = results[9].clone().expect("10th reading completes the batch");
    let expected_average = values.iter().sum::<f64>() / 10.0;
    assert_eq!(record.source, temperature);
    assert_eq!(record.count, 10);
    assert!((record.average - expected_average).abs() < 1e-12);
    assert_eq!(record.flushed_at, flushed_at);
    assert_eq!(record.reason, FlushReason::Threshold);

    let entry = accumulator.snapshot(&temperature).unwrap();
    assert_eq!(entry.count(), 0);
    assert_eq!(entry.sum(), 0.0);
    assert_eq!(entry.last_record_time(), flushed_at);
}

#[test]
fn test_next_reading_after_flush_starts_fresh_batch() {
    // Arrange
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(3).unwrap(), t0());
    let motion = SourceId::new("Motion");
    for value in [1.0, 0.0, 1.0] {
        accumulator.record(&motion, value, t0()).unwrap();
    }

    // Act
    let result = accumulator.record(&motion, 1.0, t0()).unwrap();

    // Assert
    assert!(result.is_none());
    let entry = accumulator.snapshot(&motion).unwrap();
    assert_eq!(entry.count(), 1);
    assert_eq!(entry.average(), Some(1.0));
}

#[test]
fn test_sources_are_accounted_independently() {
    // Arrange
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(2).unwrap(), t0());
    let humidity = SourceId::new("Humidity");
    let temperature = SourceId::new("Temperature");

    // Act
    let first = accumulator.record(&humidity, 40.0, t0()).unwrap();
    let other = accumulator.record(&temperature, 25.0, t0()).unwrap();
    let second = accumulator.record(&humidity, 60.0, t0()).unwrap();

    // Assert
    assert!(first.is_none());
    assert!(other.is_none());
    let record = second.unwrap();
    assert_eq!(record.source, humidity);
    assert_eq!(record.average, 50.0);
    assert_eq!(accumulator.snapshot(&temperature).unwrap().count(), 1);
}

#[test]
fn test_unknown_source_fails_loudly() {
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(10).unwrap(), t0());

    let result = accumulator.record(&SourceId::new("Pressure"), 1013.0, t0());

    match result {
        Err(SenseflowError::UnknownSource { source_id }) => {
            assert_eq!(source_id.as_str(), "Pressure");
        }
        other => panic!("expected UnknownSource, got {other:?}"),
    }
}

#[test]
fn test_count_only_policy_never_flushes_on_age() {
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(10).unwrap(), t0());
    let motion = SourceId::new("Motion");
    accumulator.record(&motion, 1.0, t0()).unwrap();

    let much_later = t0() + TimeDelta::days(7);

    assert!(accumulator.flush_stale(much_later).is_empty());
    assert!(accumulator.record(&motion, 0.0, much_later).unwrap().is_none());
}

#[test]
fn test_stale_batches_flush_by_age() {
    // Arrange
    let policy = FlushPolicy::count(10)
        .unwrap()
        .with_max_age(Duration::from_secs(60))
        .unwrap();
    let accumulator = Accumulator::new(sensors(), policy, t0());
    let humidity = SourceId::new("Humidity");
    accumulator.record(&humidity, 50.0, t0() + TimeDelta::seconds(10)).unwrap();
    accumulator.record(&humidity, 70.0, t0() + TimeDelta::seconds(20)).unwrap();

    // Act
    let too_early = accumulator.flush_stale(t0() + TimeDelta::seconds(69));
    let records = accumulator.flush_stale(t0() + TimeDelta::seconds(70));

    // Assert
    assert!(too_early.is_empty());
    assert_eq!(records.len(), 1, "empty batches are never flushed");
    assert_eq!(records[0].source, humidity);
    assert_eq!(records[0].count, 2);
    assert_eq!(records[0].average, 60.0);
    assert_eq!(records[0].reason, FlushReason::Age);
}

#[test]
fn test_record_flushes_stale_batch_on_arrival() {
    // Arrange
    let policy = FlushPolicy::count(10)
        .unwrap()
        .with_max_age(Duration::from_secs(5))
        .unwrap();
    let accumulator = Accumulator::new(sensors(), policy, t0());
    let temperature = SourceId::new("Temperature");
    accumulator.record(&temperature, 20.0, t0()).unwrap();

    // Act
    let record = accumulator
        .record(&temperature, 30.0, t0() + TimeDelta::seconds(6))
        .unwrap()
        .expect("batch outlived max age");

    // Assert
    assert_eq!(record.count, 2);
    assert_eq!(record.average, 25.0);
    assert_eq!(record.reason, FlushReason::Age);
}

#[test]
fn test_batch_age_starts_at_first_value_not_last_flush() {
    // Arrange: nothing arrives for a minute, far beyond the 5 s bound
    let policy = FlushPolicy::count(10)
        .unwrap()
        .with_max_age(Duration::from_secs(5))
        .unwrap();
    let accumulator = Accumulator::new(sensors(), policy, t0());
    let temperature = SourceId::new("Temperature");
    let opened = t0() + TimeDelta::seconds(60);

    // Act
    let first = accumulator.record(&temperature, 20.0, opened).unwrap();
    let stale_at_four = accumulator.flush_stale(opened + TimeDelta::seconds(4));
    let stale_at_five = accumulator.flush_stale(opened + TimeDelta::seconds(5));

    // Assert
    assert!(first.is_none(), "a batch opened just now is not stale");
    assert!(stale_at_four.is_empty());
    assert_eq!(stale_at_five.len(), 1);
    assert_eq!(stale_at_five[0].count, 1);
    assert_eq!(stale_at_five[0].reason, FlushReason::Age);

    let entry = accumulator.snapshot(&temperature).unwrap();
    assert_eq!(entry.opened_at(), None);
    assert_eq!(entry.last_record_time(), opened + TimeDelta::seconds(5));
}

#[test]
fn test_flush_all_emits_partial_batches_in_source_order() {
    // Arrange
    let accumulator = Accumulator::new(sensors(), FlushPolicy::count(10).unwrap(), t0());
    accumulator.record(&SourceId::new("Temperature"), 21.0, t0()).unwrap();
    accumulator.record(&SourceId::new("Motion"), 1.0, t0()).unwrap();
    accumulator.record(&SourceId::new("Motion"), 0.0, t0()).unwrap();

    // Act
    let records = accumulator.flush_all(t0());

    // Assert
    let summary: Vec<_> = records
        .iter()
        .map(|r| (r.source.as_str(), r.count, r.reason))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Motion", 2, FlushReason::Shutdown),
            ("Temperature", 1, FlushReason::Shutdown),
        ]
    );
    assert!(accumulator.flush_all(t0()).is_empty());
}

#[test]
fn test_parallel_workers_share_one_accumulator() {
    // Arrange
    const WORKERS: usize = 4;
    const PER_WORKER: usize = 250;
    let accumulator = Arc::new(Accumulator::new(
        sensors(),
        FlushPolicy::count(10).unwrap(),
        t0(),
    ));
    let temperature = SourceId::new("Temperature");

    // Act
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let accumulator = accumulator.clone();
            let temperature = temperature.clone();
            thread::spawn(move || {
                (0..PER_WORKER)
                    .filter_map(|_| accumulator.record(&temperature, 2.0, t0()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let records: Vec<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    // Assert
    assert_eq!(records.len(), WORKERS * PER_WORKER / 10);
    assert!(records.iter().all(|r| r.count == 10 && r.average == 2.0));
    assert_eq!(accumulator.snapshot(&temperature).unwrap().count(), 0);
}
