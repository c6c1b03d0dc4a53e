// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::Local;
use senseflow_sink::{CsvSink, Sink, CSV_HEADER};
use senseflow_test_utils::fixtures::{aggregate, epoch, reading, HUMIDITY, TEMPERATURE};
use std::fs;

#[test]
fn test_create_writes_header_and_directory() {
    // Arrange
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("sensor_data");

    // Act
    let sink = CsvSink::create(&dir, "sensor_averages.csv").unwrap();

    // Assert
    assert!(dir.is_dir());
    assert_eq!(sink.path(), dir.join("sensor_averages.csv"));
    let content = fs::read_to_string(sink.path()).unwrap();
    assert_eq!(content, format!("{CSV_HEADER}\n"));
}

#[test]
fn test_rows_quote_text_and_round_average() {
    // Arrange
    let tmp = tempfile::tempdir().unwrap();
    let sink = CsvSink::create(tmp.path(), "out.csv").unwrap();
    let stamp = epoch()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    // Act
    sink.notify_aggregate(&aggregate(TEMPERATURE, 27.314, 10))
        .unwrap();
    sink.notify_aggregate(&aggregate(HUMIDITY, 64.0, 3)).unwrap();

    // Assert
    let content = fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines[1], format!("\"{stamp}\",\"Temperature\",27.31,10"));
    assert_eq!(lines[2], format!("\"{stamp}\",\"Humidity\",64.00,3"));
}

#[test]
fn test_readings_are_not_persisted() {
    // Arrange
    let tmp = tempfile::tempdir().unwrap();
    let sink = CsvSink::create(tmp.path(), "out.csv").unwrap();

    // Act
    sink.notify_reading(&reading(TEMPERATURE, 20.0));

    // Assert
    let content = fs::read_to_string(sink.path()).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_create_fails_when_directory_is_a_file() {
    // Arrange
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("taken");
    fs::write(&blocker, "not a directory").unwrap();

    // Act
    let result = CsvSink::create(&blocker, "out.csv");

    // Assert
    assert!(result.unwrap_err().is_recoverable());
}
