// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use senseflow_core::{FlushReason, SenseflowError, SourceId, SourceKind};
use senseflow_exec::{Pacing, Pipeline, PipelineConfig, Producer, SourceDescriptor};
use senseflow_sink::{CsvSink, FanoutSink, Sink, CSV_HEADER};
use senseflow_test_utils::fixtures::{HUMIDITY, MOTION, TEMPERATURE};
use senseflow_test_utils::{wait_until, GatedSink, MemorySink, ScriptedGenerator};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const LONG: Duration = Duration::from_secs(10);

fn fast_config(limit: Option<u64>) -> PipelineConfig {
    let source = |id: &str, kind| {
        let descriptor = SourceDescriptor::new(id, kind).with_pacing(Pacing::immediate());
        match limit {
            Some(limit) => descriptor.with_limit(limit),
            None => descriptor,
        }
    };
    PipelineConfig {
        consumer_pacing: Pacing::immediate(),
        seed: Some(2025),
        sources: vec![
            source(TEMPERATURE, SourceKind::Temperature),
            source(HUMIDITY, SourceKind::Humidity),
            source(MOTION, SourceKind::Motion),
        ],
        ..PipelineConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_producers_ten_readings_make_three_aggregates() {
    // Arrange
    let sink = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::new(&fast_config(Some(10)), sink.clone()).unwrap();

    // Act
    pipeline.start().unwrap();
    timeout(LONG, pipeline.wait_for_producers())
        .await
        .unwrap()
        .unwrap();
    let report = timeout(LONG, pipeline.stop()).await.unwrap().unwrap();

    // Assert
    assert_eq!(report.produced(), 30);
    assert_eq!(report.consumer.consumed, 30);
    assert_eq!(report.consumer.aggregates_emitted, 3);

    let mut records = sink.aggregates();
    records.sort_by(|a, b| a.source.cmp(&b.source));
    for (record, id) in records.iter().zip([HUMIDITY, MOTION, TEMPERATURE]) {
        assert_eq!(record.source.as_str(), id);
        assert_eq!(record.count, 10);
        assert_eq!(record.reason, FlushReason::Threshold);
    }
    assert_eq!(records.len(), 3);
    assert_eq!(sink.readings().len(), 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_average_is_exact_over_a_batch() {
    // Arrange
    let config = PipelineConfig {
        consumer_pacing: Pacing::immediate(),
        sources: vec![SourceDescriptor::new("gauge", SourceKind::Motion)],
        ..PipelineConfig::default()
    };
    let producer = Producer::new("gauge", ScriptedGenerator::counting(1.0, 10), Pacing::immediate())
        .with_limit(10);
    let sink = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::with_producers(&config, vec![producer], sink.clone()).unwrap();

    // Act
    pipeline.start().unwrap();
    assert!(wait_until(LONG, || sink.aggregate_count() == 1).await);
    pipeline.stop().await.unwrap();

    // Assert
    let record = &sink.aggregates()[0];
    assert_eq!(record.count, 10);
    assert!((record.average - 5.5).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hung_sink_only_backs_up_producers() {
    // Arrange
    let config = PipelineConfig {
        buffer_capacity: 4,
        batch_threshold: 2,
        ..fast_config(None)
    };
    let sink = Arc::new(GatedSink::new());
    let mut pipeline = Pipeline::new(&config, sink.clone()).unwrap();
    let buffer = pipeline.buffer().clone();

    // Act
    pipeline.start().unwrap();
    let backed_up = wait_until(LONG, || buffer.is_full() && sink.waiting() == 1).await;

    // Assert: producers queue up to capacity without failing
    assert!(backed_up);
    assert!(!pipeline.cancel_token().is_cancelled());
    assert!(buffer.len() <= buffer.capacity());

    sink.open();
    let report = timeout(LONG, pipeline.stop()).await.unwrap().unwrap();
    assert_eq!(report.producers.len(), 3);
    assert!(sink.delivered().aggregate_count() >= 1);
    assert_eq!(report.consumer.sink_failures, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stop_returns_promptly_while_tasks_are_blocked() {
    // Arrange: slow consumer so producers block on a full buffer
    let config = PipelineConfig {
        buffer_capacity: 2,
        consumer_pacing: Pacing::fixed(60_000),
        drain_on_shutdown: false,
        ..fast_config(None)
    };
    let sink = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::new(&config, sink.clone()).unwrap();
    let buffer = pipeline.buffer().clone();
    pipeline.start().unwrap();
    assert!(wait_until(LONG, || buffer.is_full()).await);

    // Act
    let report = timeout(Duration::from_secs(2), pipeline.stop())
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(report.produced(), 2);
    assert_eq!(report.consumer.consumed, 0);
    assert!(buffer.is_closed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unknown_source_stops_the_pipeline() {
    // Arrange
    let config = PipelineConfig {
        consumer_pacing: Pacing::immediate(),
        sources: vec![SourceDescriptor::new("known", SourceKind::Motion)],
        ..PipelineConfig::default()
    };
    let stray = Producer::new("stray", || 1.0, Pacing::immediate());
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::with_producers(&config, vec![stray], sink).unwrap();
    let cancel = pipeline.cancel_token();

    // Act
    pipeline.start().unwrap();
    assert!(wait_until(LONG, || cancel.is_cancelled()).await);
    let result = timeout(LONG, pipeline.stop()).await.unwrap();

    // Assert
    match result {
        Err(SenseflowError::UnknownSource { source_id }) => {
            assert_eq!(source_id, SourceId::new("stray"));
        }
        other => panic!("expected UnknownSource, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_twice_is_an_error() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::new(&fast_config(Some(0)), sink).unwrap();

    pipeline.start().unwrap();

    assert!(pipeline.is_started());
    assert!(matches!(
        pipeline.start(),
        Err(SenseflowError::TaskError { .. })
    ));
    pipeline.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let sink: Arc<dyn Sink> = Arc::new(MemorySink::new());
    let config = PipelineConfig {
        buffer_capacity: 0,
        ..PipelineConfig::default()
    };

    let result = Pipeline::new(&config, sink);

    assert!(matches!(result, Err(SenseflowError::InvalidConfig { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_partial_batches_reach_csv_on_shutdown() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        batch_threshold: 4,
        flush_partial_on_shutdown: true,
        output_dir: dir.path().join("sensor_data"),
        ..fast_config(Some(6))
    };
    let csv = Arc::new(CsvSink::create(&config.output_dir, &config.csv_file_name).unwrap());
    let memory = Arc::new(MemorySink::new());
    let sink = Arc::new(FanoutSink::new().with(csv).with(memory.clone()));
    let mut pipeline = Pipeline::new(&config, sink).unwrap();

    // Act
    pipeline.start().unwrap();
    timeout(LONG, pipeline.wait_for_producers())
        .await
        .unwrap()
        .unwrap();
    let report = timeout(LONG, pipeline.stop()).await.unwrap().unwrap();

    // Assert: one full batch of 4 and one partial of 2 per source
    assert_eq!(report.consumer.aggregates_emitted, 6);
    let shutdown_counts: Vec<u64> = memory
        .aggregates()
        .iter()
        .filter(|r| r.reason == FlushReason::Shutdown)
        .map(|r| r.count)
        .collect();
    assert_eq!(shutdown_counts, [2, 2, 2]);

    let content = std::fs::read_to_string(config.csv_path()).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    assert_eq!(lines.count(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_age_flush_emits_stale_batch() {
    // Arrange: the threshold is never reached, only the age bound fires
    let config = PipelineConfig {
        batch_threshold: 1_000,
        max_batch_age_ms: Some(50),
        consumer_pacing: Pacing::fixed(10),
        sources: vec![SourceDescriptor::new("gauge", SourceKind::Motion)
            .with_pacing(Pacing::fixed(20))],
        ..PipelineConfig::default()
    };
    let sink = Arc::new(MemorySink::new());
    let mut pipeline = Pipeline::new(&config, sink.clone()).unwrap();

    // Act
    pipeline.start().unwrap();
    let flushed = wait_until(LONG, || {
        sink.aggregates()
            .iter()
            .any(|r| r.reason == FlushReason::Age)
    })
    .await;
    pipeline.stop().await.unwrap();

    // Assert
    assert!(flushed);
    assert!(sink.aggregates().iter().all(|r| r.count < 1_000));
}
