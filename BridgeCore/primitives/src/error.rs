//! Error types for the refbridge guest layer.
//!
//! None of these are transient: each one points at a guest-side logic defect
//! (a stale or forged handle, or an unbounded allocation loop). The bridge
//! never recovers from them; they propagate to whoever drove the call.

use core::fmt;

/// Stable error codes returned across the WASM export boundary.
///
/// `0` = OK, non-zero = error. These repr values are part of the guest ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    HandleOutOfRange = 1,
    UseAfterFree = 2,
    AllocationExhausted = 3,
    Internal = 4,
    ForeignHandle = 5,
}

impl ErrorCode {
    /// Convert from an i32 code returned by a guest export.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::HandleOutOfRange),
            2 => Some(Self::UseAfterFree),
            3 => Some(Self::AllocationExhausted),
            4 => Some(Self::Internal),
            5 => Some(Self::ForeignHandle),
            _ => None,
        }
    }

    /// Return the i32 representation of this error code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::HandleOutOfRange => write!(f, "ERR_HANDLE_OUT_OF_RANGE"),
            Self::UseAfterFree => write!(f, "ERR_USE_AFTER_FREE"),
            Self::AllocationExhausted => write!(f, "ERR_ALLOCATION_EXHAUSTED"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
            Self::ForeignHandle => write!(f, "ERR_FOREIGN_HANDLE"),
        }
    }
}

/// Failure while resolving or allocating a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The handle's index was never issued by this table.
    #[error("handle index {index} out of range (next index is {next_index})")]
    HandleOutOfRange { index: u32, next_index: u32 },

    /// The handle's slot was freed, or freed and reissued under a newer generation.
    #[error("handle #{index}@{generation} used after free")]
    UseAfterFree { index: u32, generation: u32 },

    /// The table cannot issue another handle without exceeding its slot limit.
    #[error("handle table exhausted ({limit} slots)")]
    AllocationExhausted { limit: u32 },

    /// The handle was issued by a different table.
    #[error("handle from table {table} presented to table {expected}")]
    ForeignHandle { table: u32, expected: u32 },
}

impl BridgeError {
    /// The ABI error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::HandleOutOfRange { .. } => ErrorCode::HandleOutOfRange,
            Self::UseAfterFree { .. } => ErrorCode::UseAfterFree,
            Self::AllocationExhausted { .. } => ErrorCode::AllocationExhausted,
            Self::ForeignHandle { .. } => ErrorCode::ForeignHandle,
        }
    }
}

/// Convenience result type for the guest layer.
pub type BridgeResult<T> = core::result::Result<T, BridgeError>;
