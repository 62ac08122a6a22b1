// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Hook Interceptors
//!
//! Four replacement routines stand in for kernel entry points. Each one
//! always calls the original routine with the original arguments, passes
//! its result back untouched, and updates the wake-cycle state around it:
//!
//! | Routine | Order | Effect |
//! |---|---|---|
//! | `IOHibernateSystemHasSlept` | before original | synced=false, awake=false |
//! | `IOHibernateSystemWake` | after original | awake=true |
//! | `IOPMrootDomain::tracePoint` | after original | on a wake code: awake=true, synced=false |
//! | `clock_get_calendar_microtime` | after original | resync if awake and not synced |
//!
//! The interceptor bodies are methods on [`CpuTscSync`] taking the original
//! as a closure. The `extern "C"` entry points below are what the patcher
//! installs: they find the published instance and hand it a closure that
//! calls through the original's address.
//!
//! Hooks run in whatever context the kernel calls them from, possibly with
//! interrupts disabled. Nothing here blocks or allocates.

use core::ffi::c_void;
use core::mem::transmute;

use crate::err::IO_RETURN_NOT_READY;
use crate::kernel::patcher::OriginalSlot;
use crate::kernel::plugin::{instance, CpuTscSync};
use crate::types::{
    CalendarMicrotimeFn, ClockSec, ClockUsec, HasSleptFn, IoReturn, SystemWakeFn, TracePoint,
    TracePointFn,
};
use crate::cputs_dbg;

/// ============================================================================
/// Original Routines
/// ============================================================================

/// Addresses of the four original routines
///
/// The patcher fills a slot before the matching hook goes live, so a hook
/// never runs against an empty slot. Should it happen anyway, the void
/// routines do nothing and the status routines report "not ready".
#[derive(Debug, Default)]
pub struct Originals {
    pub has_slept: OriginalSlot,
    pub system_wake: OriginalSlot,
    pub trace_point: OriginalSlot,
    pub calendar_microtime: OriginalSlot,
}

impl Originals {
    pub const fn new() -> Self {
        Self {
            has_slept: OriginalSlot::new(),
            system_wake: OriginalSlot::new(),
            trace_point: OriginalSlot::new(),
            calendar_microtime: OriginalSlot::new(),
        }
    }

    fn call_has_slept(&self) -> IoReturn {
        match self.has_slept.address() {
            // SAFETY: the patcher stored the address of the routine resolved
            // for this symbol, which has this signature.
            Some(address) => unsafe { transmute::<usize, HasSleptFn>(address)() },
            None => IO_RETURN_NOT_READY,
        }
    }

    fn call_system_wake(&self) -> IoReturn {
        match self.system_wake.address() {
            // SAFETY: as above.
            Some(address) => unsafe { transmute::<usize, SystemWakeFn>(address)() },
            None => IO_RETURN_NOT_READY,
        }
    }

    fn call_trace_point(&self, that: *mut c_void, point: TracePoint) {
        if let Some(address) = self.trace_point.address() {
            // SAFETY: as above; `that` is forwarded exactly as received.
            unsafe { transmute::<usize, TracePointFn>(address)(that, point) }
        }
    }

    fn call_calendar_microtime(&self, secs: *mut ClockSec, microsecs: *mut ClockUsec) {
        if let Some(address) = self.calendar_microtime.address() {
            // SAFETY: as above; the output pointers are the caller's.
            unsafe { transmute::<usize, CalendarMicrotimeFn>(address)(secs, microsecs) }
        }
    }
}

/// ============================================================================
/// Interceptor Bodies
/// ============================================================================

impl CpuTscSync {
    /// Sleep is starting: void the sync guarantee, then sleep
    pub fn sleep_entry(&self, original: impl FnOnce() -> IoReturn) -> IoReturn {
        cputs_dbg!("IOHibernateSystemHasSlept is called");
        self.state().mark_asleep();
        original()
    }

    /// The formal wake call has finished
    pub fn wake_complete(&self, original: impl FnOnce() -> IoReturn) -> IoReturn {
        let result = original();
        self.state().mark_awake();
        cputs_dbg!("IOHibernateSystemWake returned {:#x}", result);
        result
    }

    /// Root domain trace point; a wake code arms the resync
    pub fn power_trace(&self, point: TracePoint, original: impl FnOnce()) {
        original();

        if self.config().wake_trace_points.contains(point) {
            cputs_dbg!("tracePoint {:#04x}: cpus are waking", point);
            self.state().mark_wake_detected();
        }
    }

    /// Calendar read; the first one after a wake resyncs the counters
    pub fn calendar_read(&self, original: impl FnOnce()) {
        original();

        if self.state().needs_resync() {
            cputs_dbg!("clock_get_calendar_microtime is called after wake");
            self.resync();
        }
    }
}

/// ============================================================================
/// Kernel Entry Points
/// ============================================================================

/// Replacement for `IOHibernateSystemHasSlept`
pub extern "C" fn io_hibernate_system_has_slept() -> IoReturn {
    match instance() {
        Some(plugin) => plugin.sleep_entry(|| plugin.originals().call_has_slept()),
        None => IO_RETURN_NOT_READY,
    }
}

/// Replacement for `IOHibernateSystemWake`
pub extern "C" fn io_hibernate_system_wake() -> IoReturn {
    match instance() {
        Some(plugin) => plugin.wake_complete(|| plugin.originals().call_system_wake()),
        None => IO_RETURN_NOT_READY,
    }
}

/// Replacement for `IOPMrootDomain::tracePoint(uint8_t)`
pub extern "C" fn iopm_root_domain_trace_point(that: *mut c_void, point: TracePoint) {
    if let Some(plugin) = instance() {
        plugin.power_trace(point, || plugin.originals().call_trace_point(that, point));
    }
}

/// Replacement for `clock_get_calendar_microtime`
pub extern "C" fn clock_get_calendar_microtime(secs: *mut ClockSec, microsecs: *mut ClockUsec) {
    if let Some(plugin) = instance() {
        plugin.calendar_read(|| plugin.originals().call_calendar_microtime(secs, microsecs));
    }
}
