// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shutdown signal shared by producers, the consumer and the buffer.
//!
//! Every task holds a clone. Pacing waits and the buffer's `push`/`pop` race
//! their work against the token, so one `cancel()` unblocks the whole pipeline.
//! The buffer also keeps a private token of its own as its closed flag.

use crate::error::{Result, SenseflowError};
use event_listener::{Event, EventListener};
use std::future::{poll_fn, Future};
use std::pin::{pin, Pin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};

/// Cloneable one-way cancellation flag with async wake-up.
///
/// # Example
///
/// ```
/// use senseflow_core::CancellationToken;
///
/// # async fn example() {
/// let token = CancellationToken::new();
/// let watcher = token.clone();
///
/// tokio::spawn(async move {
///     watcher.cancelled().await;
/// });
///
/// assert!(token.cancel());
/// assert!(!token.cancel());
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    waiters: Event,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every waiter.
    ///
    /// Returns `true` for the call that actually cancelled it; later calls are
    /// no-ops and return `false`.
    pub fn cancel(&self) -> bool {
        if self.shared.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shared.waiters.notify(usize::MAX);
        true
    }

    /// ```
    /// use senseflow_core::CancellationToken;
    ///
    /// let token = CancellationToken::new();
    /// assert!(!token.is_cancelled());
    ///
    /// token.cancel();
    /// assert!(token.is_cancelled());
    /// ```
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Wait until the token is cancelled. Resolves immediately if it already is.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }

    /// Drive `future` to completion unless the token is cancelled first.
    ///
    /// Cancellation wins when both are ready on the same poll, so an
    /// already-cancelled token never starts the work.
    ///
    /// # Errors
    /// Returns [`SenseflowError::Cancelled`] when the token fires first; `future`
    /// is dropped unfinished.
    pub async fn run_until_cancelled<F: Future>(&self, future: F) -> Result<F::Output> {
        let mut cancelled = pin!(self.cancelled());
        let mut future = pin!(future);
        poll_fn(|cx| {
            if cancelled.as_mut().poll(cx).is_ready() {
                return Poll::Ready(Err(SenseflowError::Cancelled));
            }
            future.as_mut().poll(cx).map(Ok)
        })
        .await
    }
}

/// Future returned by [`CancellationToken::cancelled()`].
#[derive(Debug)]
pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<EventListener>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }
            match self.listener.as_mut() {
                Some(listener) => {
                    ready!(Pin::new(listener).poll(cx));
                    self.listener = None;
                }
                // Registered before the flag is re-read at the top of the loop
                None => self.listener = Some(self.token.shared.waiters.listen()),
            }
        }
    }
}
