// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Power-Management Trace Points
//!
//! Codes passed to `IOPMrootDomain::tracePoint` while the root power domain
//! walks through a sleep or wake transition, and the small fixed table of
//! codes that count as "the cores are coming back".

use crate::types::TracePoint;

/// Secondary cores are being woken
pub const TRACE_POINT_WAKE_CPUS: TracePoint = 0x23;

/// Maximum number of wake trace points a configuration can name
pub const MAX_WAKE_TRACE_POINTS: usize = 8;

/// Set of trace point codes that arm a resync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeTracePoints {
    codes: [TracePoint; MAX_WAKE_TRACE_POINTS],
    len: usize,
}

impl WakeTracePoints {
    /// Only the "waking secondary cores" code
    pub const fn new() -> Self {
        let mut codes = [0; MAX_WAKE_TRACE_POINTS];
        codes[0] = TRACE_POINT_WAKE_CPUS;
        Self { codes, len: 1 }
    }

    /// An empty set; nothing on the trace path arms a resync
    pub const fn empty() -> Self {
        Self {
            codes: [0; MAX_WAKE_TRACE_POINTS],
            len: 0,
        }
    }

    /// Add a code. Returns false when the table is full.
    pub fn insert(&mut self, point: TracePoint) -> bool {
        if self.contains(point) {
            return true;
        }
        if self.len == MAX_WAKE_TRACE_POINTS {
            return false;
        }
        self.codes[self.len] = point;
        self.len += 1;
        true
    }

    pub fn contains(&self, point: TracePoint) -> bool {
        self.as_slice().contains(&point)
    }

    pub fn as_slice(&self) -> &[TracePoint] {
        &self.codes[..self.len]
    }
}

impl Default for WakeTracePoints {
    fn default() -> Self {
        Self::new()
    }
}
