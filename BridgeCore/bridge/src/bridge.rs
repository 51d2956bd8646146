//! The bridge: the owned handle registry and one operation per host import.
//!
//! Every operation has one of three shapes:
//!
//! - reference-producing: resolve inputs, call the host, issue a handle for
//!   the returned reference
//! - primitive-producing: resolve inputs, call the host, return the value
//!   directly (no table mutation)
//! - mutating: resolve inputs, call the host, return nothing
//!
//! Inputs are resolved before the host is called, so a bad handle fails
//! the operation without any host-side effect.

use core::cell::RefCell;

use refbridge_primitives::{BridgeResult, Handle, HandleTable, TableConfig, TableStats};

use crate::host::HostImports;

/// Handle registry bound to one host.
///
/// Created at guest start-up and torn down with [`Bridge::shutdown`] (or
/// dropped). The table sits in a `RefCell`, so a `Bridge` is not `Sync`:
/// sharing one across threads would need an external lock.
pub struct Bridge<H: HostImports> {
    host: H,
    table: RefCell<HandleTable<H::Ref>>,
}

impl<H: HostImports> Bridge<H> {
    /// Create a bridge with the default table configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, TableConfig::default())
    }

    pub fn with_config(host: H, config: TableConfig) -> Self {
        Self {
            host,
            table: RefCell::new(HandleTable::with_config(config)),
        }
    }

    /// The host this bridge calls into.
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn stats(&self) -> TableStats {
        self.table.borrow().stats()
    }

    /// Number of handles currently live.
    pub fn live_handles(&self) -> usize {
        self.table.borrow().live()
    }

    /// The next fresh handle index the table will issue.
    pub fn next_index(&self) -> u32 {
        self.table.borrow().next_index()
    }

    pub fn capacity(&self) -> u32 {
        self.table.borrow().capacity()
    }

    /// Tear the bridge down, returning the host and the final table counters.
    pub fn shutdown(self) -> (H, TableStats) {
        let stats = self.table.borrow().stats();
        let live = self.table.borrow().live();
        if live > 0 {
            log::debug!("bridge shutdown with {} live handles", live);
        }
        (self.host, stats)
    }

    // ── Lifecycle ──

    /// Release a handle. The only explicit lifecycle entry point.
    ///
    /// Freeing a handle that is not live is ignored and returns `false`.
    pub fn free_extern_ref(&self, handle: Handle) -> bool {
        self.table.borrow_mut().free(handle)
    }

    // ── Reference-producing ──

    pub fn get_document(&self) -> BridgeResult<Handle> {
        let document = self.host.get_document();
        self.adopt(document)
    }

    /// Create an element whose tag is the string behind `name`.
    pub fn create_element(&self, name: Handle) -> BridgeResult<Handle> {
        let name = self.resolve(name)?;
        let element = self.host.create_element(&name);
        self.adopt(element)
    }

    /// `target[name]`. A missing property comes back as a handle to null.
    pub fn get_prop(&self, target: Handle, name: Handle) -> BridgeResult<Handle> {
        let target = self.resolve(target)?;
        let name = self.resolve(name)?;
        let value = self.host.get_prop(&target, &name);
        self.adopt(value)
    }

    /// Build a host string from guest bytes.
    ///
    /// The host copies `bytes` during the call; nothing keeps pointing at
    /// them afterwards.
    pub fn bridge_string(&self, bytes: &[u8]) -> BridgeResult<Handle> {
        let string = self.host.bridge_string(bytes);
        self.adopt(string)
    }

    pub fn empty_array(&self) -> BridgeResult<Handle> {
        let array = self.host.empty_array();
        self.adopt(array)
    }

    pub fn empty_dictionary(&self) -> BridgeResult<Handle> {
        let dictionary = self.host.empty_dictionary();
        self.adopt(dictionary)
    }

    // ── Primitive-producing ──

    /// `target[name]` as an integer. Never issues a handle.
    pub fn get_int_prop(&self, target: Handle, name: Handle) -> BridgeResult<i32> {
        let target = self.resolve(target)?;
        let name = self.resolve(name)?;
        Ok(self.host.get_int_prop(&target, &name))
    }

    // ── Mutating ──

    pub fn set_prop(&self, target: Handle, name: Handle, value: Handle) -> BridgeResult<()> {
        let target = self.resolve(target)?;
        let name = self.resolve(name)?;
        let value = self.resolve(value)?;
        self.host.set_prop(&target, &name, &value);
        Ok(())
    }

    pub fn append_child(&self, parent: Handle, child: Handle) -> BridgeResult<()> {
        let parent = self.resolve(parent)?;
        let child = self.resolve(child)?;
        self.host.append_child(&parent, &child);
        Ok(())
    }

    /// Push `element` onto the host array behind `array`, in place.
    pub fn array_push(&self, array: Handle, element: Handle) -> BridgeResult<()> {
        let array = self.resolve(array)?;
        let element = self.resolve(element)?;
        self.host.array_push(&array, &element);
        Ok(())
    }

    // ── Table access ──

    /// Copy out the reference behind a handle. The table borrow ends here,
    /// before any host call.
    fn resolve(&self, handle: Handle) -> BridgeResult<H::Ref> {
        self.table.borrow().resolve(handle).cloned()
    }

    fn adopt(&self, reference: H::Ref) -> BridgeResult<Handle> {
        self.table.borrow_mut().allocate(reference)
    }
}
