// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Plugin Logging
//!
//! Thin layer over the `log` facade. Every record goes out under the
//! `cputs` target so the host logger can filter the plugin as a whole.
//!
//! # Levels
//!
//! - **Debug**: wake-cycle tracing, only when debug output is enabled
//!   (`-cputsdbg` boot argument)
//! - **Info / Warning**: lifecycle and configuration
//! - **Error**: hook installation failures (the "syslog" channel)
//!
//! # Usage
//!
//! ```ignore
//! cputs_dbg!("IOHibernateSystemHasSlept is called");
//! cputs_err!("route for {} failed with error {}", symbol, err);
//! ```
//!
//! Without the `logging` feature the macros type-check their arguments and
//! emit nothing. Hooks call these from arbitrary kernel contexts, so the
//! layer itself never allocates or locks.

use core::sync::atomic::{AtomicBool, Ordering};

/// Target attached to every record
pub const LOG_TARGET: &str = "cputs";

/// Log levels
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug-level logging (verbose)
    Debug = 0,

    /// Informational logging
    Info = 1,

    /// Warning-level logging
    Warning = 2,

    /// Error-level logging
    Error = 3,
}

#[cfg(feature = "logging")]
impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Whether debug records are emitted
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable or disable debug records
pub fn set_debug_enabled(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Check whether debug records are emitted
pub fn debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Print a formatted message at a specific log level
///
/// # Arguments
///
/// * `level` - Log level for this message
/// * `args` - Format arguments
#[inline]
pub fn log_print(level: LogLevel, args: core::fmt::Arguments) {
    #[cfg(feature = "logging")]
    log::log!(target: LOG_TARGET, level.into(), "{}", args);

    #[cfg(not(feature = "logging"))]
    let _ = (level, args);
}

/// Log a debug message when debug output is enabled
#[macro_export]
macro_rules! cputs_dbg {
    ($($arg:tt)*) => {
        if $crate::kernel::debug::debug_enabled() {
            $crate::kernel::debug::log_print($crate::kernel::debug::LogLevel::Debug, format_args!($($arg)*))
        }
    };
}

/// Log an info message
#[macro_export]
macro_rules! cputs_log {
    ($($arg:tt)*) => {
        $crate::kernel::debug::log_print($crate::kernel::debug::LogLevel::Info, format_args!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! cputs_warn {
    ($($arg:tt)*) => {
        $crate::kernel::debug::log_print($crate::kernel::debug::LogLevel::Warning, format_args!($($arg)*))
    };
}

/// Log an error message
#[macro_export]
macro_rules! cputs_err {
    ($($arg:tt)*) => {
        $crate::kernel::debug::log_print($crate::kernel::debug::LogLevel::Error, format_args!($($arg)*))
    };
}
