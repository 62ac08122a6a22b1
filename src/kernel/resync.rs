// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! TSC Resynchronization
//!
//! Reads the counter once on the calling core and has every core write
//! that value into its own TSC inside a rendezvous, with interrupts masked
//! everywhere. Skew is bounded by how closely the rendezvous releases the
//! cores, not eliminated.
//!
//! Only one broadcast runs at a time. A caller that finds one already
//! running returns at once: it may hold interrupts disabled, and spinning
//! here would keep its core out of the very rendezvous it waits for.

use crate::kernel::mp::{cpu_count, Rendezvous};
use crate::kernel::state::WakeState;
use crate::kernel::tsc::{ResyncMode, TimestampCounter};
use crate::cputs_dbg;

/// Bring every core's TSC back in line and mark the state synced
///
/// Returns true if this call performed the broadcast, false if another
/// core's broadcast was already in flight.
pub fn tsc_adjust_or_reset(
    state: &WakeState,
    tsc: &dyn TimestampCounter,
    mp: &dyn Rendezvous,
    mode: ResyncMode,
) -> bool {
    if !state.try_begin_resync() {
        cputs_dbg!("resync already in flight on another cpu, skipping");
        return false;
    }

    let cpus = cpu_count(mp.online_cpus());

    match mode {
        ResyncMode::ResetAdjust if tsc.adjust_supported() => {
            cputs_dbg!("clearing TSC_ADJUST on {} cpus. Rendezvousing..", cpus);
            mp.rendezvous_no_intrs(&|| tsc.write_adjust(0));
        }
        _ => {
            let value = tsc.read();
            cputs_dbg!("current tsc from rdtsc64() is {}. Rendezvousing on {} cpus..", value, cpus);
            mp.rendezvous_no_intrs(&|| tsc.write(value));
        }
    }

    state.mark_synced();
    state.end_resync();
    true
}
