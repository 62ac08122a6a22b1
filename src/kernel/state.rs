// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Wake/Sleep State
//!
//! Two independent atomic flags tracking where the machine is in its
//! sleep/wake cycle:
//!
//! - `tsc_synced`: the TSC is known to agree across cores
//! - `kernel_is_awake`: the wake transition has been observed
//!
//! Each flag is only ever stored unconditionally, so single-flag races
//! cannot lose an update. The pair is not read atomically; the calendar
//! read path tolerates a stale view (worst case a redundant resync).
//!
//! A third flag, `resync_running`, serializes broadcasts. It is not part of
//! the wake-cycle state and never shows up in a [`WakeFlags`] snapshot.

use bitflags::bitflags;
use core::sync::atomic::{AtomicBool, Ordering};

bitflags! {
    /// Point-in-time view of the wake-cycle flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WakeFlags: u8 {
        const TSC_SYNCED = 1 << 0;
        const KERNEL_AWAKE = 1 << 1;
    }
}

/// Shared wake-cycle flags
pub struct WakeState {
    tsc_synced: AtomicBool,
    kernel_is_awake: AtomicBool,
    resync_running: AtomicBool,
}

impl WakeState {
    /// Initial state: counters synced, no wake observed yet
    pub const fn new() -> Self {
        Self {
            tsc_synced: AtomicBool::new(true),
            kernel_is_awake: AtomicBool::new(false),
            resync_running: AtomicBool::new(false),
        }
    }

    /// Build a state from explicit flag values
    pub const fn with_flags(flags: WakeFlags) -> Self {
        Self {
            tsc_synced: AtomicBool::new(flags.contains(WakeFlags::TSC_SYNCED)),
            kernel_is_awake: AtomicBool::new(flags.contains(WakeFlags::KERNEL_AWAKE)),
            resync_running: AtomicBool::new(false),
        }
    }

    pub fn tsc_synced(&self) -> bool {
        self.tsc_synced.load(Ordering::Acquire)
    }

    pub fn kernel_is_awake(&self) -> bool {
        self.kernel_is_awake.load(Ordering::Acquire)
    }

    /// Sleep has started: any earlier sync guarantee is void
    pub fn mark_asleep(&self) {
        self.tsc_synced.store(false, Ordering::Release);
        self.kernel_is_awake.store(false, Ordering::Release);
    }

    /// The formal wake call has completed
    pub fn mark_awake(&self) {
        self.kernel_is_awake.store(true, Ordering::Release);
    }

    /// Secondary cores are coming back; counters are presumed skewed
    pub fn mark_wake_detected(&self) {
        self.kernel_is_awake.store(true, Ordering::Release);
        self.tsc_synced.store(false, Ordering::Release);
    }

    /// A broadcast stamp has completed
    pub fn mark_synced(&self) {
        self.tsc_synced.store(true, Ordering::Release);
    }

    /// `!tsc_synced && kernel_is_awake`
    pub fn needs_resync(&self) -> bool {
        !self.tsc_synced() && self.kernel_is_awake()
    }

    pub fn snapshot(&self) -> WakeFlags {
        let mut flags = WakeFlags::empty();
        flags.set(WakeFlags::TSC_SYNCED, self.tsc_synced());
        flags.set(WakeFlags::KERNEL_AWAKE, self.kernel_is_awake());
        flags
    }

    /// Claim the broadcast. Returns false if another core holds it.
    pub(crate) fn try_begin_resync(&self) -> bool {
        self.resync_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn end_resync(&self) {
        self.resync_running.store(false, Ordering::Release);
    }

    pub fn resync_running(&self) -> bool {
        self.resync_running.load(Ordering::Acquire)
    }
}

impl Default for WakeState {
    fn default() -> Self {
        Self::new()
    }
}
