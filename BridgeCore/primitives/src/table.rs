//! The handle table: growable slot storage mapping handles to opaque refs.
//!
//! Slots are only ever appended, in chunks of `grow_chunk`. `next_index` is
//! the next fresh index to issue and never decreases, so
//! `next_index <= capacity` holds between calls. Every slot at or past
//! `next_index` has never been issued and holds the null reference.
//!
//! Each slot carries a generation that is bumped on free. A handle only
//! resolves while its generation matches the slot's, which turns
//! use-after-free and double-free into detectable conditions instead of
//! silent aliasing. Each table also stamps its own id into the handles it
//! issues, so a handle carried over from another table is rejected.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{ReusePolicy, TableConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{Handle, OpaqueRef};

/// Source of table ids; 0 is never handed out.
static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(1);

/// Counters describing the table's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Handles issued.
    pub allocations: u64,
    /// Handles released by `free`.
    pub frees: u64,
    /// Growth steps performed.
    pub growths: u64,
}

#[derive(Debug, Clone)]
struct Slot<R> {
    value: R,
    generation: u32,
    live: bool,
}

impl<R: OpaqueRef> Slot<R> {
    fn vacant() -> Self {
        Self {
            value: R::null(),
            generation: 0,
            live: false,
        }
    }
}

/// Append-only table of opaque references addressed by [`Handle`]s.
#[derive(Debug, Clone)]
pub struct HandleTable<R> {
    id: u32,
    slots: Vec<Slot<R>>,
    next_index: u32,
    free_list: Vec<u32>,
    live: usize,
    config: TableConfig,
    stats: TableStats,
}

impl<R: OpaqueRef> HandleTable<R> {
    /// Create an empty table (capacity 0) with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    /// Create an empty table (capacity 0).
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            next_index: 0,
            free_list: Vec::new(),
            live: 0,
            config,
            stats: TableStats::default(),
        }
    }

    /// Id stamped into every handle this table issues.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Current number of allocated slots.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// The next fresh index the table will issue.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Number of handles issued and not yet freed.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Store `value` and issue a handle for it.
    ///
    /// Under [`ReusePolicy::Recycle`] the most recently freed index is
    /// reissued first. Otherwise the handle takes `next_index`, growing the
    /// table by one chunk when that index is past the current capacity.
    pub fn allocate(&mut self, value: R) -> BridgeResult<Handle> {
        if self.config.reuse == ReusePolicy::Recycle {
            if let Some(index) = self.free_list.pop() {
                let slot = &mut self.slots[index as usize];
                slot.value = value;
                slot.live = true;
                let handle = Handle::new(self.id, index, slot.generation);
                self.live += 1;
                self.stats.allocations += 1;
                log::trace!("handle table: reissued {}", handle);
                return Ok(handle);
            }
        }

        let index = self.next_index;
        if index >= self.config.max_slots {
            return Err(BridgeError::AllocationExhausted {
                limit: self.config.max_slots,
            });
        }
        if index >= self.capacity() {
            self.grow()?;
        }

        // `index < max_slots <= u32::MAX`, so this cannot wrap.
        self.next_index = index + 1;
        let slot = &mut self.slots[index as usize];
        slot.value = value;
        slot.live = true;
        let handle = Handle::new(self.id, index, slot.generation);
        self.live += 1;
        self.stats.allocations += 1;
        log::trace!("handle table: issued {}", handle);
        Ok(handle)
    }

    /// Release a handle, clearing its slot to the null reference.
    ///
    /// Returns `false` without touching the table if the handle was never
    /// issued, was already freed, belongs to an older generation of a
    /// reissued slot, or came from another table.
    pub fn free(&mut self, handle: Handle) -> bool {
        if handle.table() != self.id {
            log::warn!("handle table {}: ignoring free of foreign handle {}", self.id, handle);
            return false;
        }
        let index = handle.index();
        if index >= self.next_index {
            log::warn!("handle table: ignoring free of unissued handle {}", handle);
            return false;
        }

        let slot = &mut self.slots[index as usize];
        if !slot.live || slot.generation != handle.generation() {
            log::warn!("handle table: ignoring free of stale handle {}", handle);
            return false;
        }

        slot.value = R::null();
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        self.stats.frees += 1;
        if self.config.reuse == ReusePolicy::Recycle {
            self.free_list.push(index);
        }
        log::trace!("handle table: freed {}", handle);
        true
    }

    /// Look up the reference a live handle stands for.
    pub fn resolve(&self, handle: Handle) -> BridgeResult<&R> {
        if handle.table() != self.id {
            return Err(BridgeError::ForeignHandle {
                table: handle.table(),
                expected: self.id,
            });
        }
        let index = handle.index();
        if index >= self.next_index {
            return Err(BridgeError::HandleOutOfRange {
                index,
                next_index: self.next_index,
            });
        }

        let slot = &self.slots[index as usize];
        if !slot.live || slot.generation != handle.generation() {
            return Err(BridgeError::UseAfterFree {
                index,
                generation: handle.generation(),
            });
        }
        Ok(&slot.value)
    }

    /// Append one chunk of null slots, clamped to `max_slots`.
    fn grow(&mut self) -> BridgeResult<()> {
        let current = self.capacity();
        let chunk = self.config.grow_chunk.max(1);
        let new_capacity = current
            .checked_add(chunk)
            .unwrap_or(u32::MAX)
            .min(self.config.max_slots);
        if new_capacity <= current {
            return Err(BridgeError::AllocationExhausted {
                limit: self.config.max_slots,
            });
        }

        self.slots.resize_with(new_capacity as usize, Slot::vacant);
        self.stats.growths += 1;
        log::debug!(
            "handle table: grew from {} to {} slots",
            current,
            new_capacity
        );
        Ok(())
    }
}

impl<R: OpaqueRef> Default for HandleTable<R> {
    fn default() -> Self {
        Self::new()
    }
}
