// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Extension Start
//!
//! Builds the process-wide plugin over the hardware TSC and the running
//! kernel's rendezvous, then publishes it.
//!
//! # Initialization Order
//!
//! 1. Parse the boot arguments
//! 2. Probe CPUID for TSC_ADJUST
//! 3. Publish the instance and register for the patcher callback

use spin::Once;

use crate::kernel::arch::amd64::Amd64Tsc;
use crate::kernel::cmdline::SyncConfig;
use crate::kernel::mp::XnuRendezvous;
use crate::kernel::patcher::PatcherHost;
use crate::kernel::plugin::CpuTscSync;
use crate::types::Result;

static TSC: Once<Amd64Tsc> = Once::new();

static RENDEZVOUS: XnuRendezvous = XnuRendezvous;

static PLUGIN: Once<CpuTscSync> = Once::new();

/// Start the plugin from the host's load entry point
pub fn kext_start(boot_args: &str, host: &mut dyn PatcherHost) -> Result {
    let tsc: &'static Amd64Tsc = TSC.call_once(Amd64Tsc::detect);
    let plugin = PLUGIN.call_once(|| {
        CpuTscSync::new(SyncConfig::from_boot_args(boot_args), tsc, &RENDEZVOUS)
    });
    plugin.init(host)
}
