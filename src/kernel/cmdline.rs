// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Boot Argument Parsing
//!
//! Builds the plugin configuration from the kernel boot arguments.
//!
//! # Design
//!
//! - Arguments are separated by whitespace
//! - Flags start with `-` and carry no value
//! - Everything else is `key=value`; unknown keys are ignored
//! - A malformed value logs a warning and keeps the default
//! - Parsing never allocates
//!
//! # Recognized arguments
//!
//! | Argument | Effect |
//! |---|---|
//! | `-cputsoff` | disable the plugin |
//! | `-cputsdbg` | emit debug records |
//! | `cputs.wakepoints=0x23,0x24` | trace point codes that arm a resync |
//! | `cputs.resync=stamp\|adjust` | how the broadcast converges the counters |
//!
//! # Usage
//!
//! ```ignore
//! let config = SyncConfig::from_boot_args("-v -cputsdbg cputs.resync=adjust");
//! assert!(config.debug);
//! ```

use crate::err::ConfigError;
use crate::kernel::tsc::ResyncMode;
use crate::trace::WakeTracePoints;
use crate::types::{Result, TracePoint};
use crate::cputs_warn;

/// Flag disabling the plugin
pub const ARG_DISABLE: &str = "-cputsoff";

/// Flag enabling debug output
pub const ARG_DEBUG: &str = "-cputsdbg";

/// Key listing the wake trace points
pub const ARG_WAKE_POINTS: &str = "cputs.wakepoints";

/// Key selecting the resync mode
pub const ARG_RESYNC: &str = "cputs.resync";

/// Plugin configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Do not register any hook
    pub disabled: bool,

    /// Emit debug records
    pub debug: bool,

    /// Trace point codes that arm a resync
    pub wake_trace_points: WakeTracePoints,

    /// How the broadcast converges the counters
    pub resync_mode: ResyncMode,
}

impl SyncConfig {
    pub const fn new() -> Self {
        Self {
            disabled: false,
            debug: false,
            wake_trace_points: WakeTracePoints::new(),
            resync_mode: ResyncMode::Stamp,
        }
    }

    /// Parse a boot argument string on top of the defaults
    pub fn from_boot_args(args: &str) -> Self {
        let mut config = Self::new();

        for arg in args.split_whitespace() {
            match arg {
                ARG_DISABLE => config.disabled = true,
                ARG_DEBUG => config.debug = true,
                _ => config.apply_pair(arg),
            }
        }

        config
    }

    fn apply_pair(&mut self, arg: &str) {
        let Some((key, value)) = arg.split_once('=') else {
            return;
        };

        match key {
            ARG_WAKE_POINTS => match parse_trace_points(value) {
                Ok(points) => self.wake_trace_points = points,
                Err(err) => cputs_warn!("ignoring {}={}: {}", key, value, err),
            },
            ARG_RESYNC => match ResyncMode::from_name(value) {
                Some(mode) => self.resync_mode = mode,
                None => cputs_warn!("ignoring {}={}: {}", key, value, ConfigError::BadResyncMode),
            },
            _ => {}
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a comma-separated list of trace point codes
pub fn parse_trace_points(value: &str) -> Result<WakeTracePoints, ConfigError> {
    let mut points = WakeTracePoints::empty();

    for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let point = parse_trace_point(item).ok_or(ConfigError::BadTracePoint)?;
        if !points.insert(point) {
            return Err(ConfigError::TooManyTracePoints);
        }
    }

    Ok(points)
}

/// Decimal or `0x`-prefixed hexadecimal byte
fn parse_trace_point(item: &str) -> Option<TracePoint> {
    match item.strip_prefix("0x").or_else(|| item.strip_prefix("0X")) {
        Some(hex) => TracePoint::from_str_radix(hex, 16).ok(),
        None => item.parse().ok(),
    }
}
