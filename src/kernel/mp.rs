// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Multi-Processor Rendezvous
//!
//! The resync needs every online core to run the same short action at
//! (almost) the same instant with interrupts disabled. The running kernel
//! already provides that primitive; this module describes it as a trait so
//! the resync logic does not depend on where it comes from.
//!
//! # Design
//!
//! - **Synchronous**: `rendezvous_no_intrs` returns only after every
//!   participating core has finished the action
//! - **All cores**: the calling core participates too
//! - **No interrupts**: the action runs with interrupts masked on every core
//!
//! # Usage
//!
//! ```ignore
//! let value = tsc.read();
//! rendezvous.rendezvous_no_intrs(&|| tsc.write(value));
//! ```

/// ============================================================================
/// CPU Masks
/// ============================================================================

/// CPU mask type (bitmask of CPUs)
pub type CpuMask = u64;

/// Maximum number of CPUs a mask can describe
pub const SMP_MAX_CPUS: u32 = 64;

/// Convert CPU number to mask
pub const fn cpu_num_to_mask(cpu: u32) -> CpuMask {
    1u64 << cpu
}

/// Number of CPUs set in a mask
pub const fn cpu_count(mask: CpuMask) -> u32 {
    mask.count_ones()
}

/// Mask with the first `count` CPUs set
pub const fn first_cpus_mask(count: u32) -> CpuMask {
    if count >= SMP_MAX_CPUS {
        CpuMask::MAX
    } else {
        cpu_num_to_mask(count) - 1
    }
}

/// ============================================================================
/// Rendezvous
/// ============================================================================

/// All-cores broadcast primitive
pub trait Rendezvous: Sync {
    /// CPUs that will take part in the next rendezvous
    fn online_cpus(&self) -> CpuMask;

    /// Run `action` on every online CPU with interrupts disabled
    ///
    /// Blocks until all CPUs have completed the action.
    fn rendezvous_no_intrs(&self, action: &(dyn Fn() + Sync));
}

/// The running kernel's `mp_rendezvous_no_intrs`
#[cfg(feature = "xnu")]
pub struct XnuRendezvous;

#[cfg(feature = "xnu")]
mod xnu {
    use super::{CpuMask, Rendezvous, XnuRendezvous};
    use core::ffi::c_void;

    extern "C" {
        fn mp_rendezvous_no_intrs(action: unsafe extern "C" fn(*mut c_void), arg: *mut c_void);

        static real_ncpus: u32;
    }

    /// Trampoline from the kernel's C callback to the Rust action
    ///
    /// # Safety
    ///
    /// `arg` must point at a live `&(dyn Fn() + Sync)`.
    unsafe extern "C" fn run_action(arg: *mut c_void) {
        let action = &*(arg as *const &(dyn Fn() + Sync));
        action();
    }

    impl Rendezvous for XnuRendezvous {
        fn online_cpus(&self) -> CpuMask {
            // SAFETY: `real_ncpus` is written once during boot.
            super::first_cpus_mask(unsafe { real_ncpus })
        }

        fn rendezvous_no_intrs(&self, action: &(dyn Fn() + Sync)) {
            let mut action = action;
            // SAFETY: the rendezvous returns only after every CPU has run the
            // trampoline, so `action` outlives all uses of the pointer.
            unsafe {
                mp_rendezvous_no_intrs(run_action, &mut action as *mut &(dyn Fn() + Sync) as *mut c_void);
            }
        }
    }
}
