//! `refbridge`: the guest-side bridge between handles and host objects.
//!
//! Guest code never sees a host reference. It holds [`Handle`]s, and every
//! operation on host objects goes through a [`Bridge`], which resolves the
//! input handles, makes exactly one host import call, and issues a fresh
//! handle for any reference the host returns.
//!
//! ## Architecture
//!
//! - [`host::HostImports`]: trait abstracting the host import functions
//! - [`host::MockHost`]: in-memory host for native testing
//! - [`bridge::Bridge`]: the owned handle registry plus the bridge operations
//! - [`dom`]: owning wrappers that free their handle on drop

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod host;
pub mod bridge;
pub mod dom;

// Re-export key types for convenience
pub use bridge::Bridge;
pub use host::{HostImports, MockHost, MockObject};
pub use refbridge_primitives::{
    BridgeError, BridgeResult, ErrorCode, Handle, HostRef, OpaqueRef, ReusePolicy, TableConfig,
    TableStats,
};
