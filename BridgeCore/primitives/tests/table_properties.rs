//! Property tests for the handle table's allocation discipline.

use proptest::prelude::*;

use refbridge_primitives::{
    BridgeError, Handle, HandleTable, HostRef, ReusePolicy, TableConfig, DEFAULT_GROW_CHUNK,
};

/// One step of a random allocate/free workload.
#[derive(Debug, Clone)]
enum Op {
    Allocate(u32),
    /// Free the n-th handle issued so far (modulo the number issued).
    Free(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1u32..10_000).prop_map(Op::Allocate),
        1 => any::<usize>().prop_map(Op::Free),
    ]
}

proptest! {
    #[test]
    fn allocate_then_resolve_returns_the_reference(values in prop::collection::vec(any::<u32>(), 1..600)) {
        let mut table = HandleTable::new();
        let handles: Vec<Handle> = values
            .iter()
            .map(|v| table.allocate(HostRef(*v)).unwrap())
            .collect();
        for (handle, value) in handles.iter().zip(&values) {
            prop_assert_eq!(*table.resolve(*handle).unwrap(), HostRef(*value));
        }
    }

    #[test]
    fn monotonic_indices_strictly_increase_and_never_repeat(ops in prop::collection::vec(op_strategy(), 1..400)) {
        let mut table = HandleTable::new();
        let mut issued: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(v) => {
                    let handle = table.allocate(HostRef(v)).unwrap();
                    if let Some(last) = issued.last() {
                        prop_assert!(handle.index() > last.index());
                    }
                    issued.push(handle);
                }
                Op::Free(n) if !issued.is_empty() => {
                    let handle = issued[n % issued.len()];
                    table.free(handle);
                    prop_assert!(
                        matches!(table.resolve(handle), Err(BridgeError::UseAfterFree { .. })),
                        "resolve after free must be UseAfterFree"
                    );
                }
                Op::Free(_) => {}
            }
        }
        prop_assert!(table.next_index() <= table.capacity());
        prop_assert_eq!(table.next_index() as usize, issued.len());
    }

    #[test]
    fn growth_happens_exactly_on_chunk_boundaries(count in 1usize..1_200) {
        let mut table = HandleTable::new();
        let first = table.allocate(HostRef(1)).unwrap();

        for n in 2..=count {
            let growths_before = table.stats().growths;
            table.allocate(HostRef(n as u32)).unwrap();
            let grew = table.stats().growths - growths_before;
            let expected = u64::from((n - 1) % DEFAULT_GROW_CHUNK as usize == 0);
            prop_assert_eq!(grew, expected, "allocation #{}", n);
        }

        prop_assert_eq!(*table.resolve(first).unwrap(), HostRef(1));
        let chunks = count.div_ceil(DEFAULT_GROW_CHUNK as usize);
        prop_assert_eq!(table.capacity() as usize, chunks * DEFAULT_GROW_CHUNK as usize);
    }

    #[test]
    fn recycled_handles_never_alias_live_ones(ops in prop::collection::vec(op_strategy(), 1..400)) {
        let config = TableConfig { reuse: ReusePolicy::Recycle, ..TableConfig::default() };
        let mut table = HandleTable::with_config(config);
        let mut live: Vec<(Handle, HostRef)> = Vec::new();
        let mut dead: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(v) => {
                    let handle = table.allocate(HostRef(v)).unwrap();
                    prop_assert!(live.iter().all(|(h, _)| h.index() != handle.index()));
                    live.push((handle, HostRef(v)));
                }
                Op::Free(n) if !live.is_empty() => {
                    let (handle, _) = live.swap_remove(n % live.len());
                    prop_assert!(table.free(handle));
                    dead.push(handle);
                }
                Op::Free(_) => {}
            }
        }

        for (handle, value) in &live {
            prop_assert_eq!(table.resolve(*handle).unwrap(), value);
        }
        for handle in &dead {
            prop_assert!(table.resolve(*handle).is_err());
        }
        prop_assert_eq!(table.live(), live.len());
    }
}
