// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use senseflow_core::{CancellationToken, Cancelled, Result, SenseflowError};
use std::fmt;
use tokio::sync::Semaphore;

/// Fixed-capacity circular queue shared by all producers and the consumer.
///
/// # Invariants
///
/// - `0 <= len() <= capacity()` at all times
/// - Both cursors stay in `[0, capacity)`
/// - Items are delivered in the order their writers acquired the ring lock
///
/// The ring lock is held only for the slot write/read and cursor advance, never
/// across an `.await`, so a slow caller of `pop` cannot stall producers beyond the
/// buffer's capacity.
pub struct BoundedBuffer<T> {
    ring: Mutex<Ring<T>>,
    empty_slots: Semaphore,
    filled_slots: Semaphore,
    closed: CancellationToken,
    capacity: usize,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    write: usize,
    read: usize,
    occupied: usize,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            write: 0,
            read: 0,
            occupied: 0,
        }
    }

    fn put(&mut self, item: T) {
        let capacity = self.slots.len();
        debug_assert!(self.occupied < capacity, "write into a full ring");
        debug_assert!(
            self.slots[self.write].is_none(),
            "slot {} overwritten before it was read",
            self.write
        );

        self.slots[self.write] = Some(item);
        self.write = (self.write + 1) % capacity;
        self.occupied += 1;
    }

    fn take(&mut self) -> T {
        let capacity = self.slots.len();
        let Some(item) = self.slots[self.read].take() else {
            unreachable!("filled-slot permit granted but slot {} is empty", self.read);
        };

        self.read = (self.read + 1) % capacity;
        self.occupied -= 1;
        item
    }
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer with `capacity` slots.
    ///
    /// # Errors
    /// Returns [`SenseflowError::InvalidConfig`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SenseflowError::config_error(
                "buffer capacity must be at least 1",
            ));
        }
        if capacity > Semaphore::MAX_PERMITS {
            return Err(SenseflowError::config_error(format!(
                "buffer capacity {capacity} exceeds {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            empty_slots: Semaphore::new(capacity),
            filled_slots: Semaphore::new(0),
            closed: CancellationToken::new(),
            capacity,
        })
    }

    /// Wait for a free slot, then append `item`.
    ///
    /// # Errors
    /// - [`SenseflowError::Cancelled`] if `cancel` fires before a slot frees up
    /// - [`SenseflowError::BufferClosed`] if [`close`](Self::close) was called
    ///
    /// On error the item is dropped and the buffer is unchanged.
    pub async fn push(&self, item: T, cancel: &CancellationToken) -> Result<()> {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SenseflowError::Cancelled),
            () = self.closed.cancelled() => return Err(SenseflowError::BufferClosed),
            permit = self.empty_slots.acquire() => {
                permit.map_err(|_| SenseflowError::BufferClosed)?
            }
        };
        // Ownership of the slot moves into the ring; the consumer hands it back.
        permit.forget();

        self.ring.lock().put(item);
        self.filled_slots.add_permits(1);
        Ok(())
    }

    /// Wait for a filled slot, then remove and return the oldest item.
    ///
    /// # Errors
    /// - [`SenseflowError::Cancelled`] if `cancel` fires while the buffer is empty
    /// - [`SenseflowError::BufferClosed`] if [`close`](Self::close) was called;
    ///   remaining items can still be drained with [`try_pop`](Self::try_pop)
    pub async fn pop(&self, cancel: &CancellationToken) -> Result<T> {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SenseflowError::Cancelled),
            () = self.closed.cancelled() => return Err(SenseflowError::BufferClosed),
            permit = self.filled_slots.acquire() => {
                permit.map_err(|_| SenseflowError::BufferClosed)?
            }
        };
        permit.forget();

        let item = self.ring.lock().take();
        self.empty_slots.add_permits(1);
        Ok(item)
    }

    /// Append `item` if a slot is free right now; hands it back otherwise.
    ///
    /// # Errors
    /// Returns the item when the buffer is full or closed.
    pub fn try_push(&self, item: T) -> std::result::Result<(), T> {
        if self.closed.is_cancelled() {
            return Err(item);
        }
        let Ok(permit) = self.empty_slots.try_acquire() else {
            return Err(item);
        };
        permit.forget();

        self.ring.lock().put(item);
        self.filled_slots.add_permits(1);
        Ok(())
    }

    /// Remove the oldest item if one is buffered. Works after [`close`](Self::close),
    /// which is how the consumer drains on shutdown.
    pub fn try_pop(&self) -> Option<T> {
        let permit = self.filled_slots.try_acquire().ok()?;
        permit.forget();

        let item = self.ring.lock().take();
        self.empty_slots.add_permits(1);
        Some(item)
    }

    /// Wake every waiting `push`/`pop` with [`SenseflowError::BufferClosed`] and
    /// reject further pushes. Buffered items stay available to `try_pop`.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once [`close`](Self::close) has been called. After that no new
    /// item can enter the buffer.
    pub fn closed(&self) -> Cancelled<'_> {
        self.closed.cancelled()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.ring.lock().occupied
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.capacity)
            .field("occupied", &ring.occupied)
            .field("write", &ring.write)
            .field("read", &ring.read)
            .field("closed", &self.closed.is_cancelled())
            .finish()
    }
}
