// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel ABI type aliases shared by the hooks and their originals

/// IOKit return code (`IOReturn`, a `kern_return_t`)
pub type IoReturn = i32;

/// Calendar seconds (`clock_sec_t`)
pub type ClockSec = u64;

/// Calendar microseconds (`clock_usec_t`)
pub type ClockUsec = u32;

/// Power-management trace point code
pub type TracePoint = u8;

/// Error code type (negative values indicate errors)
pub type Status = i32;

/// Result type for plugin operations
pub type Result<T = (), E = Status> = core::result::Result<T, E>;

/// ============================================================================
/// Kernel Routine Signatures
/// ============================================================================

/// `IOReturn IOHibernateSystemHasSlept(void)`
pub type HasSleptFn = unsafe extern "C" fn() -> IoReturn;

/// `IOReturn IOHibernateSystemWake(void)`
pub type SystemWakeFn = unsafe extern "C" fn() -> IoReturn;

/// `void IOPMrootDomain::tracePoint(uint8_t)` with the implicit `this`
pub type TracePointFn = unsafe extern "C" fn(that: *mut core::ffi::c_void, point: TracePoint);

/// `void clock_get_calendar_microtime(clock_sec_t *, clock_usec_t *)`
pub type CalendarMicrotimeFn = unsafe extern "C" fn(secs: *mut ClockSec, microsecs: *mut ClockUsec);
