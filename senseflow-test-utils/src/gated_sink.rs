// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::memory_sink::MemorySink;
use parking_lot::{Condvar, Mutex};
use senseflow_core::{AggregateRecord, Reading, Result};
use senseflow_sink::Sink;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A sink whose `notify_aggregate` blocks the calling thread until [`open`] is
/// called. Models a persistence layer that hangs indefinitely.
///
/// Built with [`gating_readings`](GatedSink::gating_readings), `notify_reading`
/// blocks at the same gate, like a terminal nobody is reading from.
///
/// [`open`]: GatedSink::open
#[derive(Debug, Default)]
pub struct GatedSink {
    open: Mutex<bool>,
    opened: Condvar,
    waiting: AtomicUsize,
    gate_readings: bool,
    delivered: MemorySink,
}

impl GatedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate that holds back readings as well as aggregates
    pub fn gating_readings() -> Self {
        Self {
            gate_readings: true,
            ..Self::default()
        }
    }

    /// Release every blocked and future `notify_aggregate` call
    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    /// Number of sink calls currently stuck at the gate
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Sink that received everything that made it through the gate
    pub fn delivered(&self) -> &MemorySink {
        &self.delivered
    }

    fn pass_gate(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.opened.wait(&mut open);
        }
        drop(open);
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Sink for GatedSink {
    fn notify_reading(&self, reading: &Reading) {
        if self.gate_readings {
            self.pass_gate();
        }
        self.delivered.notify_reading(reading);
    }

    fn notify_aggregate(&self, record: &AggregateRecord) -> Result<()> {
        self.pass_gate();
        self.delivered.notify_aggregate(record)
    }
}
