// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Logging for the pipeline tasks.
//!
//! With the `tracing` feature every macro becomes a `tracing` event at the
//! matching level. Without it, messages go to stderr with a `[senseflow] LEVEL`
//! prefix so they never interleave with console sink lines on stdout, and debug
//! messages are dropped.

#[cfg(feature = "tracing")]
#[doc(hidden)]
#[macro_export]
macro_rules! __pipeline_log {
    ($level:ident, $($arg:tt)*) => {
        tracing::event!(tracing::Level::$level, $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __pipeline_log {
    (DEBUG, $($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
    ($level:ident, $($arg:tt)*) => {
        eprintln!("[senseflow] {:<5} {}", stringify!($level), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__pipeline_log!(ERROR, $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__pipeline_log!(WARN, $($arg)*) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__pipeline_log!(INFO, $($arg)*) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::__pipeline_log!(DEBUG, $($arg)*) };
}
