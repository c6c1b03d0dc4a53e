// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Pluggable value policy for one producer.
///
/// Each producer owns its generator exclusively, so `next_value` takes `&mut self`.
/// Closures work directly:
///
/// ```
/// use senseflow_core::ValueGenerator;
///
/// let mut counter = 0.0;
/// let mut generator = move || {
///     counter += 1.0;
///     counter
/// };
/// assert_eq!(generator.next_value(), 1.0);
/// assert_eq!(generator.next_value(), 2.0);
/// ```
pub trait ValueGenerator: Send {
    fn next_value(&mut self) -> f64;
}

impl<F> ValueGenerator for F
where
    F: FnMut() -> f64 + Send,
{
    fn next_value(&mut self) -> f64 {
        self()
    }
}
