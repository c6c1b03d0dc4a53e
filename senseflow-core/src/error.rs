// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the senseflow pipeline
//!
//! Capacity exhaustion is never an error: producers and the consumer wait instead.
//! The variants below cover cancellation, wiring bugs (an unknown source reaching
//! the accumulator), sink failures and configuration problems.
//!
//! # Examples
//!
//! ```
//! use senseflow_core::{Result, SenseflowError};
//!
//! fn check_capacity(capacity: usize) -> Result<()> {
//!     if capacity == 0 {
//!         return Err(SenseflowError::config_error("buffer capacity must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_capacity(0).is_err());
//! ```

use crate::source::SourceId;

/// Root error type for all senseflow operations
#[derive(Debug, thiserror::Error)]
pub enum SenseflowError {
    /// The cancellation token fired while an operation was waiting
    #[error("Operation cancelled")]
    Cancelled,

    /// The buffer was closed while an operation was waiting
    #[error("Buffer closed")]
    BufferClosed,

    /// A reading for a source the accumulator was not configured with
    ///
    /// This is a producer/consumer wiring bug, not a runtime condition.
    #[error("Unknown source: {source_id}")]
    UnknownSource {
        /// The offending source identifier
        source_id: SourceId,
    },

    /// A sink could not display or persist a record
    #[error("Sink error: {context}")]
    SinkError {
        /// What the sink was doing
        context: String,
        /// Underlying I/O or encoding failure, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration rejected by validation or failed to load
    #[error("Invalid configuration: {context}")]
    InvalidConfig {
        /// Why the configuration was rejected
        context: String,
    },

    /// A producer or consumer task panicked or was aborted
    #[error("Task failed: {context}")]
    TaskError {
        /// Which task failed and how
        context: String,
    },
}

impl SenseflowError {
    /// Create a sink error without an underlying cause
    pub fn sink_error(context: impl Into<String>) -> Self {
        Self::SinkError {
            context: context.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::InvalidConfig {
            context: context.into(),
        }
    }

    /// Create a task error
    pub fn task_error(context: impl Into<String>) -> Self {
        Self::TaskError {
            context: context.into(),
        }
    }

    /// Create an unknown-source error
    pub fn unknown_source(source_id: SourceId) -> Self {
        Self::UnknownSource { source_id }
    }

    /// Check if the pipeline can keep running after this error
    ///
    /// Sink failures lose one record at most; everything else ends the task.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SinkError { .. })
    }

    /// Check if this error is part of an orderly shutdown
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(self, Self::Cancelled | Self::BufferClosed)
    }
}

/// Specialized Result type for senseflow operations
pub type Result<T> = std::result::Result<T, SenseflowError>;

/// Helper trait for turning foreign I/O errors into sink errors with context
pub trait ResultExt<T> {
    /// Wrap the error as a [`SenseflowError::SinkError`] with the given context
    ///
    /// # Errors
    /// Returns `Err(SenseflowError::SinkError)` if the underlying result is `Err`.
    fn sink_context(self, context: impl Into<String>) -> Result<T>;

    /// Like [`sink_context`](ResultExt::sink_context), building the context lazily
    ///
    /// # Errors
    /// Returns `Err(SenseflowError::SinkError)` if the underlying result is `Err`.
    fn with_sink_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn sink_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SenseflowError::SinkError {
            context: context.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_sink_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SenseflowError::SinkError {
            context: f(),
            source: Some(Box::new(e)),
        })
    }
}
