// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Registration Tests
//!
//! Tests for routing the four hooks through the kernel patcher: trampoline
//! kinds, the route-once latch, and partial failure. The instances here are
//! never published, so routing goes through `route_kernel` directly.

use crate::err::PatcherError;
use crate::kernel::cmdline::SyncConfig;
use crate::kernel::patcher::{
    KernelPatcher, RouteKind, SYM_CLOCK_GET_CALENDAR_MICROTIME, SYM_IOPM_ROOT_DOMAIN_TRACE_POINT,
    SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT, SYM_IO_HIBERNATE_SYSTEM_WAKE,
};
use crate::kernel::plugin::RoutedHooks;
use crate::kernel::tests::plugin_on;
use crate::kernel::tests::recording_patcher::RecordingPatcher;

const ALL_SYMBOLS: [&str; 4] = [
    SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT,
    SYM_IO_HIBERNATE_SYSTEM_WAKE,
    SYM_IOPM_ROOT_DOMAIN_TRACE_POINT,
    SYM_CLOCK_GET_CALENDAR_MICROTIME,
];

#[test]
fn test_routes_all_four_hooks() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new();

    assert_eq!(plugin.route_kernel(&mut patcher), RoutedHooks::all());
    assert_eq!(plugin.routed_hooks(), RoutedHooks::all());

    for symbol in ALL_SYMBOLS {
        assert_eq!(patcher.attempts(symbol), 1, "{}", symbol);
    }

    let originals = plugin.originals();
    assert!(originals.has_slept.is_routed());
    assert!(originals.system_wake.is_routed());
    assert!(originals.trace_point.is_routed());
    assert!(originals.calendar_microtime.is_routed());
}

#[test]
fn test_trampoline_kinds() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new();
    plugin.route_kernel(&mut patcher);

    assert_eq!(patcher.kind_of(SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT), Some(RouteKind::Long));
    assert_eq!(patcher.kind_of(SYM_IO_HIBERNATE_SYSTEM_WAKE), Some(RouteKind::Long));
    assert_eq!(patcher.kind_of(SYM_IOPM_ROOT_DOMAIN_TRACE_POINT), Some(RouteKind::Short));
    assert_eq!(patcher.kind_of(SYM_CLOCK_GET_CALENDAR_MICROTIME), Some(RouteKind::Short));
}

#[test]
fn test_original_addresses_are_stored() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new()
        .with_original(SYM_IO_HIBERNATE_SYSTEM_WAKE, 0xFFFF_FF80_0042_0000)
        .with_original(SYM_CLOCK_GET_CALENDAR_MICROTIME, 0xFFFF_FF80_0077_1230);
    plugin.route_kernel(&mut patcher);

    assert_eq!(plugin.originals().system_wake.address(), Some(0xFFFF_FF80_0042_0000));
    assert_eq!(
        plugin.originals().calendar_microtime.address(),
        Some(0xFFFF_FF80_0077_1230)
    );
}

#[test]
fn test_second_patcher_load_routes_nothing() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new();

    plugin.route_kernel(&mut patcher);
    assert_eq!(plugin.route_kernel(&mut patcher), RoutedHooks::empty());
    assert_eq!(plugin.route_kernel(&mut patcher), RoutedHooks::empty());

    assert_eq!(patcher.routes().len(), 4);
    for symbol in ALL_SYMBOLS {
        assert_eq!(patcher.attempts(symbol), 1, "{}", symbol);
    }
    // The first call's result survives
    assert_eq!(plugin.routed_hooks(), RoutedHooks::all());
}

#[test]
fn test_error_state_cleared_on_every_call() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new();

    patcher.set_error(PatcherError::LockError);
    plugin.route_kernel(&mut patcher);
    assert_eq!(patcher.error(), PatcherError::NoError);
    assert_eq!(patcher.clear_calls(), 1);

    patcher.set_error(PatcherError::AlreadyDone);
    plugin.route_kernel(&mut patcher);
    assert_eq!(patcher.error(), PatcherError::NoError);
    assert_eq!(patcher.clear_calls(), 2);
}

#[test]
fn test_failed_hook_does_not_block_the_others() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new()
        .fail(SYM_IO_HIBERNATE_SYSTEM_HAS_SLEPT, PatcherError::NoSymbolFound)
        .fail(SYM_IOPM_ROOT_DOMAIN_TRACE_POINT, PatcherError::DisasmFailure);

    let routed = plugin.route_kernel(&mut patcher);

    assert_eq!(routed, RoutedHooks::WAKE_COMPLETE | RoutedHooks::CALENDAR_READ);
    assert_eq!(plugin.routed_hooks(), routed);
    for symbol in ALL_SYMBOLS {
        assert_eq!(patcher.attempts(symbol), 1, "{}", symbol);
    }

    assert!(!plugin.originals().has_slept.is_routed());
    assert!(!plugin.originals().trace_point.is_routed());
    assert!(plugin.originals().system_wake.is_routed());
    assert!(plugin.originals().calendar_microtime.is_routed());

    // One clear per failure, one before returning
    assert_eq!(patcher.clear_calls(), 3);
    assert_eq!(patcher.error(), PatcherError::NoError);
}

#[test]
fn test_failed_routing_is_not_retried() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut failing = RecordingPatcher::new()
        .fail(SYM_CLOCK_GET_CALENDAR_MICROTIME, PatcherError::MemoryProtection);
    plugin.route_kernel(&mut failing);

    let mut healthy = RecordingPatcher::new();
    assert_eq!(plugin.route_kernel(&mut healthy), RoutedHooks::empty());
    assert!(healthy.routes().is_empty());
    assert!(!plugin.routed_hooks().contains(RoutedHooks::CALENDAR_READ));
}

#[test]
fn test_nothing_routed_before_patcher_load() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    assert_eq!(plugin.routed_hooks(), RoutedHooks::empty());
    assert!(!plugin.originals().has_slept.is_routed());
}

#[test]
fn test_unpublished_instance_refuses_to_route() {
    let (plugin, _machine) = plugin_on(2, SyncConfig::new());
    let mut patcher = RecordingPatcher::new();
    patcher.set_error(PatcherError::LockError);

    assert!(!plugin.is_published());
    assert_eq!(plugin.process_kernel(&mut patcher), RoutedHooks::empty());
    assert!(patcher.routes().is_empty());
    assert_eq!(plugin.routed_hooks(), RoutedHooks::empty());
    assert!(!plugin.originals().calendar_microtime.is_routed());
    assert_eq!(patcher.error(), PatcherError::NoError);

    // The refusal does not use up the route-once latch
    assert_eq!(plugin.route_kernel(&mut patcher), RoutedHooks::all());
}
