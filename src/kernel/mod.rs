// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel-side plugin: wake tracking, hooks and the TSC resync.

// Architecture module
pub mod arch;

pub mod cmdline;
pub mod debug;
pub mod hooks;
pub mod mp;
pub mod patcher;
pub mod plugin;
pub mod resync;
pub mod state;
pub mod tsc;

#[cfg(all(feature = "xnu", target_arch = "x86_64"))]
pub mod init;

#[cfg(test)]
pub(crate) mod tests;
