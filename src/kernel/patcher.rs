// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Patcher Interface
//!
//! The host framework resolves kernel symbols and installs trampolines.
//! This module is the contract between it and the plugin:
//!
//! - the plugin hands over one [`RouteRequest`] per routine it wants
//!   intercepted
//! - the patcher installs the hook and stores the address of the original
//!   routine into the request's [`OriginalSlot`]
//! - after a failure the patcher holds an error code until it is cleared

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::err::PatcherError;

/// ============================================================================
/// Kernel Symbols
/// ============================================================================

pub const SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT: &str = "_IOHibernateSystemHasSlept";
pub const SYM_IO_HIBERNATE_SYSTEM_WAKE: &str = "_IOHibernateSystemWake";
pub const SYM_IOPM_ROOT_DOMAIN_TRACE_POINT: &str = "__ZN14IOPMrootDomain10tracePointEh";
pub const SYM_CLOCK_GET_CALENDAR_MICROTIME: &str = "_clock_get_calendar_microtime";

/// ============================================================================
/// Original Routine Slots
/// ============================================================================

/// Address of an original routine, filled in by the patcher
///
/// Zero means "not routed". The hooks read the slot on every call, so it
/// is an atomic rather than a plain field.
#[derive(Debug)]
pub struct OriginalSlot(AtomicUsize);

impl OriginalSlot {
    pub const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Record the original routine's address
    pub fn store(&self, address: usize) {
        self.0.store(address, Ordering::Release);
    }

    pub fn address(&self) -> Option<usize> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            address => Some(address),
        }
    }

    pub fn is_routed(&self) -> bool {
        self.address().is_some()
    }
}

impl Default for OriginalSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// ============================================================================
/// Routing
/// ============================================================================

/// Trampoline flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Ordinary jump at the routine's entry
    Short,

    /// Absolute long jump; needed when the routine is too short or too far
    /// away for the ordinary trampoline
    Long,
}

/// One routine to intercept
#[derive(Debug)]
pub struct RouteRequest<'a> {
    /// Kernel symbol of the original routine
    pub symbol: &'static str,

    /// Address of the replacement routine
    pub replacement: usize,

    /// Receives the original routine's address on success
    pub original: &'a OriginalSlot,
}

/// Symbol resolution and hook installation service
pub trait KernelPatcher {
    /// Install one hook in the kernel image
    ///
    /// On success the original routine's address has been stored into
    /// `request.original`. On failure [`error`](Self::error) describes why.
    fn route(&mut self, request: &RouteRequest<'_>, kind: RouteKind) -> bool;

    /// Error left by the last failed operation
    fn error(&self) -> PatcherError;

    fn clear_error(&mut self);
}

/// Invoked by the host once the kernel patcher is ready
pub type PatcherLoadCallback = fn(&mut dyn KernelPatcher);

/// Plugin host framework
pub trait PatcherHost {
    /// Run `callback` when the kernel patcher becomes available
    fn on_patcher_load(&mut self, callback: PatcherLoadCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_slot() {
        let slot = OriginalSlot::new();
        assert!(!slot.is_routed());
        assert_eq!(slot.address(), None);

        slot.store(0xFFFF_FF80_0020_1000);
        assert!(slot.is_routed());
        assert_eq!(slot.address(), Some(0xFFFF_FF80_0020_1000));
    }
}
