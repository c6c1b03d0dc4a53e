// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use senseflow_core::ValueGenerator;

/// Replays `values` in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedGenerator {
    /// # Panics
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "ScriptedGenerator needs at least one value");
        Self { values, next: 0 }
    }

    /// `start, start + 1, start + 2, ...` for `len` values
    pub fn counting(start: f64, len: usize) -> Self {
        Self::new((0..len).map(|n| start + n as f64).collect::<Vec<_>>())
    }
}

impl ValueGenerator for ScriptedGenerator {
    fn next_value(&mut self) -> f64 {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}
