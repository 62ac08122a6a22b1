// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! CPU TSC Sync Plugin
//!
//! Owns the wake-cycle state, the original-routine slots and the hardware
//! backends, and binds the four hooks through the kernel patcher.
//!
//! # Design
//!
//! - **One live instance**: `init` publishes the instance into a
//!   process-wide slot; the `extern "C"` hooks have no other way back to it
//! - **Route once**: `process_kernel` is latched, later calls only clear the
//!   patcher's error state. It routes only for the published instance
//! - **Independent hooks**: a hook that cannot be routed is logged and
//!   skipped; the others still go in
//!
//! # Usage
//!
//! ```ignore
//! static PLUGIN: CpuTscSync = CpuTscSync::new(SyncConfig::new(), &TSC, &RENDEZVOUS);
//!
//! PLUGIN.init(&mut host)?;
//! // host later calls back with the patcher; the hooks are now live
//! ```

use bitflags::bitflags;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use spin::Once;

use crate::err::{CPUTS_ERR_ALREADY_EXISTS, CPUTS_ERR_DISABLED};
use crate::kernel::cmdline::{SyncConfig, ARG_DISABLE};
use crate::kernel::debug;
use crate::kernel::hooks::{self, Originals};
use crate::kernel::mp::Rendezvous;
use crate::kernel::patcher::{
    KernelPatcher, PatcherHost, RouteKind, RouteRequest, SYM_CLOCK_GET_CALENDAR_MICROTIME,
    SYM_IOPM_ROOT_DOMAIN_TRACE_POINT, SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT, SYM_IO_HIBERNATE_SYSTEM_WAKE,
};
use crate::kernel::resync;
use crate::kernel::state::WakeState;
use crate::kernel::tsc::TimestampCounter;
use crate::types::Result;
use crate::{cputs_dbg, cputs_err, cputs_log};

bitflags! {
    /// Hooks that were installed
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RoutedHooks: u8 {
        const SLEEP_ENTRY = 1 << 0;
        const WAKE_COMPLETE = 1 << 1;
        const POWER_TRACE = 1 << 2;
        const CALENDAR_READ = 1 << 3;
    }
}

/// The published instance
static INSTANCE: Once<&'static CpuTscSync> = Once::new();

/// Instance the kernel hooks report to, once `init` has run
pub fn instance() -> Option<&'static CpuTscSync> {
    INSTANCE.get().copied()
}

/// Post-wake TSC synchronization plugin
pub struct CpuTscSync {
    config: SyncConfig,
    state: WakeState,
    tsc: &'static dyn TimestampCounter,
    mp: &'static dyn Rendezvous,
    originals: Originals,
    kernel_routed: AtomicBool,
    routed: AtomicU8,
}

impl CpuTscSync {
    pub const fn new(
        config: SyncConfig,
        tsc: &'static dyn TimestampCounter,
        mp: &'static dyn Rendezvous,
    ) -> Self {
        Self {
            config,
            state: WakeState::new(),
            tsc,
            mp,
            originals: Originals::new(),
            kernel_routed: AtomicBool::new(false),
            routed: AtomicU8::new(0),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> &WakeState {
        &self.state
    }

    pub fn originals(&self) -> &Originals {
        &self.originals
    }

    /// Hooks installed by `process_kernel`
    pub fn routed_hooks(&self) -> RoutedHooks {
        RoutedHooks::from_bits_truncate(self.routed.load(Ordering::Acquire))
    }

    /// Publish this instance and arrange for routing once the patcher loads
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the instance is live
    /// - `Err(CPUTS_ERR_DISABLED)` if `-cputsoff` was given
    /// - `Err(CPUTS_ERR_ALREADY_EXISTS)` if another instance was published
    pub fn init(&'static self, host: &mut dyn PatcherHost) -> Result {
        if self.config.disabled {
            cputs_log!("disabled by {} boot argument", ARG_DISABLE);
            return Err(CPUTS_ERR_DISABLED);
        }

        let published = INSTANCE.call_once(|| self);
        if !core::ptr::eq(*published, self) {
            cputs_err!("another CpuTscSync instance is already active");
            return Err(CPUTS_ERR_ALREADY_EXISTS);
        }

        debug::set_debug_enabled(self.config.debug);

        host.on_patcher_load(|patcher| {
            if let Some(plugin) = instance() {
                plugin.process_kernel(patcher);
            }
        });

        cputs_log!(
            "initialized in {} mode, waiting for the kernel patcher",
            self.config.resync_mode.as_str()
        );
        Ok(())
    }

    /// Whether the kernel hooks report to this instance
    pub fn is_published(&self) -> bool {
        instance().is_some_and(|live| core::ptr::eq(live, self))
    }

    /// Route the four hooks through `patcher`
    ///
    /// Only the published instance routes, since the installed hooks find
    /// their originals through it. Only the first call routes; it returns
    /// the hooks that went in. Later calls, and calls on an unpublished
    /// instance, return an empty set. Either way the patcher's error state
    /// is cleared before returning.
    pub fn process_kernel(&self, patcher: &mut dyn KernelPatcher) -> RoutedHooks {
        if !self.is_published() {
            cputs_err!("refusing to route kernel hooks for an unpublished instance");
            patcher.clear_error();
            return RoutedHooks::empty();
        }

        self.route_kernel(patcher)
    }

    /// Routing behind `process_kernel`, without the publication check
    pub(crate) fn route_kernel(&self, patcher: &mut dyn KernelPatcher) -> RoutedHooks {
        let mut routed = RoutedHooks::empty();

        if self
            .kernel_routed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let long_jump = [
                (
                    RoutedHooks::SLEEP_ENTRY,
                    RouteRequest {
                        symbol: SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT,
                        replacement: hooks::io_hibernate_system_has_slept as *const () as usize,
                        original: &self.originals.has_slept,
                    },
                ),
                (
                    RoutedHooks::WAKE_COMPLETE,
                    RouteRequest {
                        symbol: SYM_IO_HIBERNATE_SYSTEM_WAKE,
                        replacement: hooks::io_hibernate_system_wake as *const () as usize,
                        original: &self.originals.system_wake,
                    },
                ),
            ];
            routed |= route_each(patcher, &long_jump, RouteKind::Long);

            let short_jump = [
                (
                    RoutedHooks::POWER_TRACE,
                    RouteRequest {
                        symbol: SYM_IOPM_ROOT_DOMAIN_TRACE_POINT,
                        replacement: hooks::iopm_root_domain_trace_point as *const () as usize,
                        original: &self.originals.trace_point,
                    },
                ),
                (
                    RoutedHooks::CALENDAR_READ,
                    RouteRequest {
                        symbol: SYM_CLOCK_GET_CALENDAR_MICROTIME,
                        replacement: hooks::clock_get_calendar_microtime as *const () as usize,
                        original: &self.originals.calendar_microtime,
                    },
                ),
            ];
            routed |= route_each(patcher, &short_jump, RouteKind::Short);

            self.routed.store(routed.bits(), Ordering::Release);
            cputs_log!(
                "routed {} of {} kernel hooks",
                routed.bits().count_ones(),
                RoutedHooks::all().bits().count_ones()
            );
        } else {
            cputs_dbg!("kernel hooks already routed");
        }

        // Errors left behind for other processors are not ours to report.
        patcher.clear_error();
        routed
    }

    /// Stamp one TSC value into every core and mark the state synced
    ///
    /// Returns false if another core's resync was already running.
    pub fn resync(&self) -> bool {
        resync::tsc_adjust_or_reset(&self.state, self.tsc, self.mp, self.config.resync_mode)
    }
}

/// Route each request on its own so one failure does not block the rest
fn route_each(
    patcher: &mut dyn KernelPatcher,
    requests: &[(RoutedHooks, RouteRequest<'_>)],
    kind: RouteKind,
) -> RoutedHooks {
    let mut routed = RoutedHooks::empty();

    for (hook, request) in requests {
        if patcher.route(request, kind) {
            routed |= *hook;
        } else {
            cputs_err!(
                "failed to route {}: {}",
                request.symbol,
                patcher.error()
            );
            patcher.clear_error();
        }
    }

    routed
}
