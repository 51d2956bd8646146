//! Core types: handles and opaque host references.

use core::fmt;

/// Number of slots the handle table grows by when it runs out of room.
pub const DEFAULT_GROW_CHUNK: u32 = 256;

/// Largest number of slots a table may ever hold.
///
/// Handle indices travel through the guest as signed 32-bit integers in
/// the WASM ABI, so the index space stops at `i32::MAX`.
pub const MAX_TABLE_SLOTS: u32 = i32::MAX as u32;

/// A value owned and interpreted solely by the host.
///
/// The guest can only thread these through calls. Every reference type has
/// a distinguished null value meaning "no object"; freed table slots hold it.
pub trait OpaqueRef: Clone {
    /// The null reference.
    fn null() -> Self;

    /// Returns true if this is the null reference.
    fn is_null(&self) -> bool;
}

/// Host reference as it travels across the WASM boundary.
///
/// The host hands out non-zero ids for its objects; `0` is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostRef(pub u32);

impl HostRef {
    /// The null host reference.
    pub const NULL: HostRef = HostRef(0);

    /// Reinterpret an `i32` received from the WASM ABI.
    pub fn from_abi(raw: i32) -> Self {
        Self(raw as u32)
    }

    /// The `i32` representation passed across the WASM ABI.
    pub fn to_abi(self) -> i32 {
        self.0 as i32
    }
}

impl OpaqueRef for HostRef {
    fn null() -> Self {
        Self::NULL
    }

    fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "ref(null)")
        } else {
            write!(f, "ref({})", self.0)
        }
    }
}

/// Guest-side token standing in for an opaque reference.
///
/// `index` selects the table slot; `generation` is bumped every time that
/// slot is freed, so a handle kept past its `free` no longer matches.
/// `table` names the table that issued the handle; no other table accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    table: u32,
    index: u32,
    generation: u32,
}

impl Handle {
    pub(crate) fn new(table: u32, index: u32, generation: u32) -> Self {
        Self {
            table,
            index,
            generation,
        }
    }

    /// Id of the table that issued this handle.
    pub fn table(self) -> u32 {
        self.table
    }

    /// Slot index in the handle table.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_ref_null() {
        assert!(HostRef::null().is_null());
        assert!(HostRef::default().is_null());
        assert!(!HostRef(7).is_null());
    }

    #[test]
    fn test_host_ref_abi_conversion() {
        assert_eq!(HostRef::from_abi(42), HostRef(42));
        assert_eq!(HostRef(42).to_abi(), 42);
        assert_eq!(HostRef::from_abi(0), HostRef::NULL);
    }

    #[test]
    fn test_display() {
        assert_eq!(alloc::format!("{}", HostRef(3)), "ref(3)");
        assert_eq!(alloc::format!("{}", HostRef::NULL), "ref(null)");
        assert_eq!(alloc::format!("{}", Handle::new(1, 5, 2)), "#5@2");
    }

    #[test]
    fn test_max_slots_fits_abi() {
        assert_eq!(MAX_TABLE_SLOTS as i32, i32::MAX);
    }
}
