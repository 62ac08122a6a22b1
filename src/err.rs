// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Status and Error Codes
//!
//! IOKit return codes seen at the hook boundary, and the error vocabulary
//! of the kernel patcher and of boot-argument parsing.

use core::fmt;

pub use crate::types::{IoReturn, Status};

/// Compose an IOKit common error (`sys_iokit | sub_iokit_common | code`)
const fn iokit_common_err(code: u32) -> IoReturn {
    (0xE000_0000u32 | code) as IoReturn
}

/// Success status code
pub const IO_RETURN_SUCCESS: IoReturn = 0;

/// Device not ready
pub const IO_RETURN_NOT_READY: IoReturn = iokit_common_err(0x2D8);

/// Plugin status: disabled by boot arguments
pub const CPUTS_ERR_DISABLED: Status = -1;

/// Plugin status: another instance is already published
pub const CPUTS_ERR_ALREADY_EXISTS: Status = -9;

/// ============================================================================
/// Patcher Errors
/// ============================================================================

/// Error state reported by the kernel patcher after a failed route
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatcherError {
    #[default]
    NoError = 0,
    NoKinfoFound = 1,
    NoSymbolFound = 2,
    KernInitFailure = 3,
    KernRunningInitFailure = 4,
    AlreadyDone = 5,
    LockError = 6,
    Unsupported = 7,
    MemoryIssue = 8,
    DisasmFailure = 9,
    MemoryProtection = 10,
}

impl PatcherError {
    /// Raw error number as the patcher reports it
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for PatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PatcherError::NoError => "no error",
            PatcherError::NoKinfoFound => "no kernel info found",
            PatcherError::NoSymbolFound => "symbol not found",
            PatcherError::KernInitFailure => "kernel init failure",
            PatcherError::KernRunningInitFailure => "running kernel init failure",
            PatcherError::AlreadyDone => "already done",
            PatcherError::LockError => "lock error",
            PatcherError::Unsupported => "unsupported",
            PatcherError::MemoryIssue => "memory issue",
            PatcherError::DisasmFailure => "disassembly failure",
            PatcherError::MemoryProtection => "memory protection failure",
        };
        write!(f, "{} ({})", text, self.code())
    }
}

/// ============================================================================
/// Configuration Errors
/// ============================================================================

/// Boot-argument parsing failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A trace point code was not a byte-sized integer
    BadTracePoint,
    /// More wake trace points than the table holds
    TooManyTracePoints,
    /// Unknown resync mode name
    BadResyncMode,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadTracePoint => write!(f, "invalid trace point code"),
            ConfigError::TooManyTracePoints => write!(f, "too many wake trace points"),
            ConfigError::BadResyncMode => write!(f, "unknown resync mode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iokit_codes() {
        assert_eq!(IO_RETURN_NOT_READY as u32, 0xE000_02D8);
        assert!(IO_RETURN_NOT_READY < 0);
    }

    #[test]
    fn test_patcher_error_display() {
        let text = std::format!("{}", PatcherError::NoSymbolFound);
        assert_eq!(text, "symbol not found (2)");
        assert_eq!(PatcherError::default(), PatcherError::NoError);
    }
}
