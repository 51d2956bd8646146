//! Host import contract: abstraction over the functions the host provides.
//!
//! The `HostImports` trait decouples the bridge from the execution
//! environment (WASM guest vs. native tests).
//!
//! - In WASM: implemented by calling the `js` / `document` imports
//! - In tests: implemented via `MockHost` (in-memory object store)
//! - In the sandbox: the host-side object heap backs the imports

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use refbridge_primitives::{HostRef, OpaqueRef};

/// The functions a host runtime must provide to the bridge.
///
/// Inputs are live references previously returned by the host. The host
/// owns every semantic decision; the bridge only threads references through.
/// Methods take `&self`: host objects are shared and mutated in place.
pub trait HostImports {
    /// Opaque reference type handed out by this host.
    type Ref: OpaqueRef;

    /// The global document object.
    fn get_document(&self) -> Self::Ref;

    /// A new, empty dictionary object.
    fn empty_dictionary(&self) -> Self::Ref;

    /// A new, empty array.
    fn empty_array(&self) -> Self::Ref;

    /// Append `element` to `array` in place.
    fn array_push(&self, array: &Self::Ref, element: &Self::Ref);

    /// Copy `bytes` (UTF-8) out of guest memory into a new host string.
    fn bridge_string(&self, bytes: &[u8]) -> Self::Ref;

    /// `target[name] = value`.
    fn set_prop(&self, target: &Self::Ref, name: &Self::Ref, value: &Self::Ref);

    /// `target[name]`.
    fn get_prop(&self, target: &Self::Ref, name: &Self::Ref) -> Self::Ref;

    /// `target[name]`, coerced to a 32-bit integer.
    fn get_int_prop(&self, target: &Self::Ref, name: &Self::Ref) -> i32;

    /// Create an element with the tag named by the string `name`.
    fn create_element(&self, name: &Self::Ref) -> Self::Ref;

    /// Append `child` to `parent`'s children.
    fn append_child(&self, parent: &Self::Ref, child: &Self::Ref);
}

// ── MockHost: in-memory host for testing ──

/// An object stored by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockObject {
    Document { props: BTreeMap<String, HostRef> },
    Element {
        tag: String,
        props: BTreeMap<String, HostRef>,
        children: Vec<HostRef>,
    },
    Dictionary { props: BTreeMap<String, HostRef> },
    Array(Vec<HostRef>),
    Str(String),
}

/// In-memory host implementation for deterministic testing.
///
/// Objects live in a vector indexed by `HostRef` (slot 0 is null) and are
/// never collected. Calls on the wrong kind of object are ignored and
/// lookups that find nothing return null, so tests can exercise the bridge
/// without a real document.
#[derive(Debug)]
pub struct MockHost {
    objects: RefCell<Vec<Option<MockObject>>>,
    document: HostRef,
    calls: Cell<u64>,
}

impl MockHost {
    /// Create a host holding a document whose `body` is an empty element.
    pub fn new() -> Self {
        let host = Self {
            objects: RefCell::new(alloc::vec![None]),
            document: HostRef(1),
            calls: Cell::new(0),
        };
        let document = host.insert(MockObject::Document { props: BTreeMap::new() });
        let body = host.insert(MockObject::Element {
            tag: "body".to_string(),
            props: BTreeMap::new(),
            children: Vec::new(),
        });
        host.with_props(document, |props| {
            props.insert("body".to_string(), body);
        });
        host
    }

    /// Store an object and return its reference.
    pub fn insert(&self, object: MockObject) -> HostRef {
        let mut objects = self.objects.borrow_mut();
        objects.push(Some(object));
        HostRef((objects.len() - 1) as u32)
    }

    /// A copy of the object behind `r`, if any.
    pub fn object(&self, r: HostRef) -> Option<MockObject> {
        self.objects.borrow().get(r.0 as usize).cloned().flatten()
    }

    /// The text of a string object.
    pub fn string_value(&self, r: HostRef) -> Option<String> {
        match self.object(r)? {
            MockObject::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Children of an element, or items of an array.
    pub fn children(&self, r: HostRef) -> Vec<HostRef> {
        match self.object(r) {
            Some(MockObject::Element { children, .. }) => children,
            Some(MockObject::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    /// Reference to `document.body`.
    pub fn body(&self) -> HostRef {
        self.prop_by_key(self.document, "body")
    }

    /// Number of host import calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls.get()
    }

    /// Number of objects ever created (including the document and body).
    pub fn object_count(&self) -> usize {
        self.objects.borrow().len() - 1
    }

    fn record_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn key(&self, name: &HostRef) -> Option<String> {
        self.string_value(*name)
    }

    fn prop_by_key(&self, target: HostRef, key: &str) -> HostRef {
        match self.object(target) {
            Some(MockObject::Document { props })
            | Some(MockObject::Dictionary { props })
            | Some(MockObject::Element { props, .. }) => {
                props.get(key).copied().unwrap_or(HostRef::NULL)
            }
            _ => HostRef::NULL,
        }
    }

    fn with_props(&self, target: HostRef, f: impl FnOnce(&mut BTreeMap<String, HostRef>)) {
        let mut objects = self.objects.borrow_mut();
        match objects.get_mut(target.0 as usize) {
            Some(Some(MockObject::Document { props }))
            | Some(Some(MockObject::Dictionary { props }))
            | Some(Some(MockObject::Element { props, .. })) => f(props),
            _ => {}
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostImports for MockHost {
    type Ref = HostRef;

    fn get_document(&self) -> HostRef {
        self.record_call();
        self.document
    }

    fn empty_dictionary(&self) -> HostRef {
        self.record_call();
        self.insert(MockObject::Dictionary { props: BTreeMap::new() })
    }

    fn empty_array(&self) -> HostRef {
        self.record_call();
        self.insert(MockObject::Array(Vec::new()))
    }

    fn array_push(&self, array: &HostRef, element: &HostRef) {
        self.record_call();
        if let Some(Some(MockObject::Array(items))) =
            self.objects.borrow_mut().get_mut(array.0 as usize)
        {
            items.push(*element);
        }
    }

    fn bridge_string(&self, bytes: &[u8]) -> HostRef {
        self.record_call();
        self.insert(MockObject::Str(String::from_utf8_lossy(bytes).into_owned()))
    }

    fn set_prop(&self, target: &HostRef, name: &HostRef, value: &HostRef) {
        self.record_call();
        if let Some(key) = self.key(name) {
            self.with_props(*target, |props| {
                props.insert(key, *value);
            });
        }
    }

    fn get_prop(&self, target: &HostRef, name: &HostRef) -> HostRef {
        self.record_call();
        let Some(key) = self.key(name) else {
            return HostRef::NULL;
        };
        if let Some(MockObject::Element { tag, .. }) = self.object(*target) {
            if key == "tagName" {
                return self.insert(MockObject::Str(tag.to_uppercase()));
            }
        }
        self.prop_by_key(*target, &key)
    }

    fn get_int_prop(&self, target: &HostRef, name: &HostRef) -> i32 {
        self.record_call();
        let Some(key) = self.key(name) else {
            return 0;
        };
        match (self.object(*target), key.as_str()) {
            (Some(MockObject::Array(items)), "length") => items.len() as i32,
            (Some(MockObject::Element { children, .. }), "childElementCount") => {
                children.len() as i32
            }
            _ => self
                .string_value(self.prop_by_key(*target, &key))
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    fn create_element(&self, name: &HostRef) -> HostRef {
        self.record_call();
        let tag = self.key(name).unwrap_or_default().to_lowercase();
        self.insert(MockObject::Element {
            tag,
            props: BTreeMap::new(),
            children: Vec::new(),
        })
    }

    fn append_child(&self, parent: &HostRef, child: &HostRef) {
        self.record_call();
        if let Some(Some(MockObject::Element { children, .. })) =
            self.objects.borrow_mut().get_mut(parent.0 as usize)
        {
            children.push(*child);
        }
    }
}
