// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Source identity and simulated value policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of one logical producer of readings.
///
/// Cloning is a reference-count bump, so readings can carry their source cheaply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0.as_ref().to_owned()
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What a simulated source measures, and therefore which values it produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// 15.0 to 39.9, in 0.1 steps
    Temperature,
    /// 30.0 to 99.9, in 0.1 steps
    Humidity,
    /// 0 or 1
    Motion,
    /// Uniform over `[min, max)`
    Uniform { min: f64, max: f64 },
}

impl SourceKind {
    /// Inclusive lower and exclusive upper bound of the values this kind produces.
    ///
    /// Motion is reported as `(0.0, 2.0)` since it yields the integers 0 and 1.
    pub fn value_range(&self) -> (f64, f64) {
        match *self {
            Self::Temperature => (15.0, 40.0),
            Self::Humidity => (30.0, 100.0),
            Self::Motion => (0.0, 2.0),
            Self::Uniform { min, max } => (min, max),
        }
    }
}
