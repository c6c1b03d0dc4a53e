// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use senseflow_core::{SourceKind, ValueGenerator};

/// Random values in the range of a [`SourceKind`].
///
/// Temperature and humidity move in 0.1 steps, motion is 0 or 1. Seeding makes a
/// run reproducible.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    kind: SourceKind,
    rng: StdRng,
}

impl SimulatedSensor {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(kind: SourceKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    fn tenths(&mut self, base: f64, steps: u32) -> f64 {
        base + f64::from(self.rng.random_range(0..steps)) / 10.0
    }
}

impl ValueGenerator for SimulatedSensor {
    fn next_value(&mut self) -> f64 {
        match self.kind {
            SourceKind::Temperature => self.tenths(15.0, 250),
            SourceKind::Humidity => self.tenths(30.0, 700),
            SourceKind::Motion => f64::from(self.rng.random_range(0..2u32)),
            SourceKind::Uniform { min, max } if min < max => self.rng.random_range(min..max),
            SourceKind::Uniform { min, .. } => min,
        }
    }
}
