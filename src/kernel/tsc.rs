// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Time Stamp Counter access
//!
//! Every method acts on the TSC of the core it is called on. Inside a
//! rendezvous that is each participating core in turn.

/// Per-core timestamp counter
pub trait TimestampCounter: Sync {
    /// Read this core's counter
    fn read(&self) -> u64;

    /// Overwrite this core's counter
    fn write(&self, value: u64);

    /// Whether the per-core TSC_ADJUST offset register exists
    fn adjust_supported(&self) -> bool;

    /// Overwrite this core's TSC_ADJUST offset
    ///
    /// Only meaningful when [`adjust_supported`](Self::adjust_supported)
    /// returns true.
    fn write_adjust(&self, value: i64);
}

/// How a resync converges the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncMode {
    /// Stamp one captured counter value into every core
    #[default]
    Stamp,

    /// Zero every core's TSC_ADJUST offset, falling back to `Stamp`
    /// when the register does not exist
    ResetAdjust,
}

impl ResyncMode {
    /// Boot-argument spelling
    pub fn as_str(self) -> &'static str {
        match self {
            ResyncMode::Stamp => "stamp",
            ResyncMode::ResetAdjust => "adjust",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stamp" => Some(ResyncMode::Stamp),
            "adjust" => Some(ResyncMode::ResetAdjust),
            _ => None,
        }
    }
}
