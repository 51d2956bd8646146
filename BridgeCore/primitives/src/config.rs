//! Handle table configuration.

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_GROW_CHUNK, MAX_TABLE_SLOTS};

/// What happens to a slot index after its handle is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// Freed indices are never reissued. The handle space grows with the
    /// total number of allocations, regardless of frees.
    #[default]
    Monotonic,
    /// Freed indices go on a free list and are reissued (LIFO) under a
    /// bumped generation before the table issues fresh indices.
    Recycle,
}

/// Configuration for a [`HandleTable`](crate::HandleTable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Slots appended per growth step. Default: 256. Zero is treated as 1.
    pub grow_chunk: u32,

    /// Hard cap on slots. Allocation past it fails with `AllocationExhausted`.
    /// Default: `i32::MAX`.
    pub max_slots: u32,

    /// Index reuse after free.
    pub reuse: ReusePolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            grow_chunk: DEFAULT_GROW_CHUNK,
            max_slots: MAX_TABLE_SLOTS,
            reuse: ReusePolicy::Monotonic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TableConfig::default();
        assert_eq!(config.grow_chunk, 256);
        assert_eq!(config.max_slots, i32::MAX as u32);
        assert_eq!(config.reuse, ReusePolicy::Monotonic);
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"reuse": "recycle"}"#).unwrap();
        assert_eq!(config.reuse, ReusePolicy::Recycle);
        assert_eq!(config.grow_chunk, 256);
        assert_eq!(config.max_slots, MAX_TABLE_SLOTS);
    }
}
