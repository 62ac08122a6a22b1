// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! x86 TSC (Time Stamp Counter)
//!
//! `rdtsc` for reads, `wrmsr` on IA32_TSC for stamps, and IA32_TSC_ADJUST
//! when CPUID advertises it (CPUID.07H:EBX[bit 1]).

use core::arch::x86_64::{__cpuid, __cpuid_count, _rdtsc};
use x86_64::registers::model_specific::Msr;

use crate::kernel::tsc::TimestampCounter;

/// IA32_TIME_STAMP_COUNTER
pub const MSR_IA32_TSC: u32 = 0x10;

/// IA32_TSC_ADJUST
pub const MSR_IA32_TSC_ADJUST: u32 = 0x3B;

/// Hardware TSC of the executing core
#[derive(Debug, Clone, Copy)]
pub struct Amd64Tsc {
    adjust: bool,
}

impl Amd64Tsc {
    /// Probe CPUID for TSC_ADJUST support
    pub fn detect() -> Self {
        Self {
            adjust: x86_tsc_adjust_supported(),
        }
    }

    /// Skip detection; for statics built before CPUID can be queried
    pub const fn with_adjust(adjust: bool) -> Self {
        Self { adjust }
    }
}

/// Check CPUID leaf 7 for the TSC_ADJUST MSR
// `__cpuid*` are safe fns on newer toolchains and unsafe on older ones.
#[allow(unused_unsafe)]
pub fn x86_tsc_adjust_supported() -> bool {
    // SAFETY: CPUID is available on every x86-64 processor.
    let max_leaf = unsafe { __cpuid(0) }.eax;
    if max_leaf < 7 {
        return false;
    }
    // SAFETY: leaf 7 is within the supported range checked above.
    let leaf7 = unsafe { __cpuid_count(7, 0) };
    leaf7.ebx & (1 << 1) != 0
}

impl TimestampCounter for Amd64Tsc {
    fn read(&self) -> u64 {
        // SAFETY: `rdtsc` has no side effects.
        unsafe { _rdtsc() }
    }

    fn write(&self, value: u64) {
        let mut msr = Msr::new(MSR_IA32_TSC);
        // SAFETY: IA32_TSC is architectural and writable at CPL 0. The
        // caller runs inside a rendezvous with interrupts disabled.
        unsafe { msr.write(value) }
    }

    fn adjust_supported(&self) -> bool {
        self.adjust
    }

    fn write_adjust(&self, value: i64) {
        if !self.adjust {
            return;
        }
        let mut msr = Msr::new(MSR_IA32_TSC_ADJUST);
        // SAFETY: presence of the MSR was confirmed through CPUID.
        unsafe { msr.write(value as u64) }
    }
}
