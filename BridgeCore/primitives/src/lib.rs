//! `refbridge-primitives`: foundational types for the refbridge guest layer.
//!
//! This crate provides the handle type, the opaque reference abstraction,
//! error codes, table configuration, and the [`HandleTable`] itself. It is
//! shared by the bridge, the WASM guest, and the sandbox host.
//!
//! Supports `#![no_std]` for WASM guest compatibility (use `default-features = false`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod types;
pub mod error;
pub mod config;
pub mod table;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Handle, HostRef, OpaqueRef, DEFAULT_GROW_CHUNK, MAX_TABLE_SLOTS};
pub use error::{BridgeError, BridgeResult, ErrorCode};
pub use config::{ReusePolicy, TableConfig};
pub use table::{HandleTable, TableStats};
