// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! CpuTscSync - Post-Wake TSC Synchronization
//!
//! Some firmware leaves the per-core time stamp counters out of step after
//! the machine wakes from sleep. Threads that migrate between cores then
//! see time jump or run backwards. This crate intercepts four kernel
//! routines to notice the wake, and on the first calendar read afterwards
//! stamps a single TSC value into every core inside an all-cores
//! rendezvous.
//!
//! The hook installation itself belongs to the host patching framework;
//! the crate only names the routines and supplies the replacements.

#![cfg_attr(not(test), no_std)]

// Common types
pub mod err;
pub mod trace;
pub mod types;

// Kernel-side plugin
pub mod kernel;

pub use kernel::cmdline::SyncConfig;
pub use kernel::mp::{CpuMask, Rendezvous};
pub use kernel::patcher::{KernelPatcher, OriginalSlot, PatcherHost, RouteKind, RouteRequest};
pub use kernel::plugin::{instance, CpuTscSync, RoutedHooks};
pub use kernel::state::{WakeFlags, WakeState};
pub use kernel::tsc::{ResyncMode, TimestampCounter};

#[cfg(all(feature = "xnu", target_arch = "x86_64"))]
pub use kernel::init::kext_start;
