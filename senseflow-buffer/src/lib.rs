// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Fixed-capacity handoff between many producers and one consumer.
//!
//! [`BoundedBuffer`] is the classic two-counter bounded buffer: one counting
//! semaphore tracks empty slots, one tracks filled slots, and a separate mutex
//! serializes cursor and slot mutation among concurrent producers. Producers wait
//! when the buffer is full, the consumer waits when it is empty, and both give up
//! when the shared [`CancellationToken`](senseflow_core::CancellationToken) fires.
//!
//! ```
//! use senseflow_buffer::BoundedBuffer;
//! use senseflow_core::CancellationToken;
//!
//! # async fn example() -> senseflow_core::Result<()> {
//! let buffer = BoundedBuffer::new(2)?;
//! let cancel = CancellationToken::new();
//!
//! buffer.push("a", &cancel).await?;
//! buffer.push("b", &cancel).await?;
//! assert!(buffer.is_full());
//!
//! assert_eq!(buffer.pop(&cancel).await?, "a");
//! # Ok(())
//! # }
//! ```

pub mod bounded_buffer;

pub use self::bounded_buffer::BoundedBuffer;
