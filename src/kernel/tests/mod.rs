// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! CpuTscSync Test Suite
//!
//! # Organization
//!
//! - [`machine`] - Simulated multi-core machine (TSC + rendezvous)
//! - [`recording_patcher`] - Kernel patcher stand-in that records routes
//! - `wake_cycle_tests` - Interceptor bodies and sleep/wake scenarios
//! - `resync_tests` - Broadcast stamping and adjust-mode behavior
//! - `registration_tests` - Hook routing, latch and partial failure
//! - `hook_entry_tests` - Kernel entry points through the published instance


mod registration_tests;

use crate::kernel::cmdline::SyncConfig;
use crate::kernel::plugin::CpuTscSync;
use machine::SimulatedMachine;

/// Give a test value the `'static` lifetime the plugin backends need
pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// A fresh, unpublished plugin over a simulated machine
pub fn plugin_on(cpus: usize, config: SyncConfig) -> (&'static CpuTscSync, &'static SimulatedMachine) {
    let machine = leak(SimulatedMachine::new(cpus));
    let plugin = leak(CpuTscSync::new(config, machine, machine));
    (plugin, machine)
}
