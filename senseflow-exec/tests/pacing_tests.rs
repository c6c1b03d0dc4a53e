// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rand::rngs::StdRng;
use rand::SeedableRng;
use senseflow_core::{SourceKind, ValueGenerator};
use senseflow_exec::{Pacing, SimulatedSensor};
use std::time::Duration;

#[test]
fn test_fixed_pacing_is_constant() {
    let mut rng = StdRng::seed_from_u64(1);
    let pacing = Pacing::fixed(2_000);

    for _ in 0..10 {
        assert_eq!(pacing.next_delay(&mut rng), Duration::from_secs(2));
    }
}

#[test]
fn test_uniform_pacing_stays_inclusive_in_range() {
    let mut rng = StdRng::seed_from_u64(2);
    let pacing = Pacing::uniform(1_000, 3_000);

    let delays: Vec<Duration> = (0..500).map(|_| pacing.next_delay(&mut rng)).collect();

    assert!(delays
        .iter()
        .all(|d| (Duration::from_secs(1)..=Duration::from_secs(3)).contains(d)));
    assert!(delays.iter().any(|d| *d != delays[0]));
}

#[test]
fn test_degenerate_uniform_pacing() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(
        Pacing::uniform(250, 250).next_delay(&mut rng),
        Duration::from_millis(250)
    );
    assert!(Pacing::uniform(250, 250).validate("x").is_ok());
    assert!(Pacing::uniform(251, 250).validate("x").is_err());
}

#[test]
fn test_pacing_json_shape() {
    let json = serde_json::to_value(Pacing::uniform(1, 2)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "mode": "uniform", "min_ms": 1, "max_ms": 2 })
    );
}

#[test]
fn test_simulated_values_stay_in_kind_range() {
    for kind in [
        SourceKind::Temperature,
        SourceKind::Humidity,
        SourceKind::Motion,
        SourceKind::Uniform { min: -1.0, max: 1.0 },
    ] {
        let (low, high) = kind.value_range();
        let mut sensor = SimulatedSensor::seeded(kind, 11);
        for _ in 0..1_000 {
            let value = sensor.next_value();
            assert!(value >= low && value < high, "{kind:?} produced {value}");
        }
    }
}

#[test]
fn test_temperature_moves_in_tenths() {
    let mut sensor = SimulatedSensor::seeded(SourceKind::Temperature, 5);
    for _ in 0..200 {
        let tenths = sensor.next_value() * 10.0;
        assert!((tenths - tenths.round()).abs() < 1e-6);
    }
}

#[test]
fn test_motion_is_binary() {
    let mut sensor = SimulatedSensor::seeded(SourceKind::Motion, 9);
    let values: Vec<f64> = (0..200).map(|_| sensor.next_value()).collect();
    assert!(values.iter().all(|v| *v == 0.0 || *v == 1.0));
    assert!(values.contains(&0.0) && values.contains(&1.0));
}

#[test]
fn test_same_seed_same_values() {
    let mut first = SimulatedSensor::seeded(SourceKind::Humidity, 99);
    let mut second = SimulatedSensor::seeded(SourceKind::Humidity, 99);

    let a: Vec<f64> = (0..20).map(|_| first.next_value()).collect();
    let b: Vec<f64> = (0..20).map(|_| second.next_value()).collect();

    assert_eq!(a, b);
}
