//! Owning wrappers over bridge handles.
//!
//! Each wrapper owns exactly one handle and frees it when dropped, so guest
//! code written against these types cannot leak a handle or free one twice.
//! Borrowing a wrapper (`&JsString`) lends the handle to an operation
//! without giving up ownership.

use refbridge_primitives::{BridgeResult, Handle};

use crate::bridge::Bridge;
use crate::host::HostImports;

/// Anything that can lend its handle to a bridge operation.
pub trait AsHandle {
    fn handle(&self) -> Handle;
}

impl AsHandle for Handle {
    fn handle(&self) -> Handle {
        *self
    }
}

/// A handle that is released exactly once, on drop.
struct Owned<'b, H: HostImports> {
    bridge: &'b Bridge<H>,
    handle: Handle,
}

impl<H: HostImports> Drop for Owned<'_, H> {
    fn drop(&mut self) {
        self.bridge.free_extern_ref(self.handle);
    }
}

macro_rules! define_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'b, H: HostImports> {
            owned: Owned<'b, H>,
        }

        impl<'b, H: HostImports> $name<'b, H> {
            /// Take ownership of `handle`; it is freed when the wrapper drops.
            pub fn from_handle(bridge: &'b Bridge<H>, handle: Handle) -> Self {
                Self {
                    owned: Owned { bridge, handle },
                }
            }

            fn bridge(&self) -> &'b Bridge<H> {
                self.owned.bridge
            }
        }

        impl<H: HostImports> AsHandle for $name<'_, H> {
            fn handle(&self) -> Handle {
                self.owned.handle
            }
        }
    };
}

define_wrapper!(
    /// Any host object.
    JsObject
);
define_wrapper!(
    /// A host string.
    JsString
);
define_wrapper!(
    /// A host array, mutated in place by `push`.
    JsArray
);
define_wrapper!(
    /// A host dictionary (plain object).
    JsDictionary
);
define_wrapper!(
    /// A document element.
    HtmlElement
);
define_wrapper!(
    /// The global document.
    Document
);

impl<'b, H: HostImports> JsObject<'b, H> {
    /// `self[name]`.
    pub fn get(&self, name: &JsString<'b, H>) -> BridgeResult<JsObject<'b, H>> {
        let value = self.bridge().get_prop(self.handle(), name.handle())?;
        Ok(JsObject::from_handle(self.bridge(), value))
    }

    /// `self[name] = value`.
    pub fn set(&self, name: &JsString<'b, H>, value: &impl AsHandle) -> BridgeResult<()> {
        self.bridge().set_prop(self.handle(), name.handle(), value.handle())
    }

    /// `self[name]` as an integer.
    pub fn get_int(&self, name: &JsString<'b, H>) -> BridgeResult<i32> {
        self.bridge().get_int_prop(self.handle(), name.handle())
    }
}

impl<'b, H: HostImports> JsString<'b, H> {
    /// Copy `text` into a new host string.
    pub fn new(bridge: &'b Bridge<H>, text: &str) -> BridgeResult<Self> {
        let handle = bridge.bridge_string(text.as_bytes())?;
        Ok(Self::from_handle(bridge, handle))
    }
}

impl<'b, H: HostImports> JsArray<'b, H> {
    pub fn new(bridge: &'b Bridge<H>) -> BridgeResult<Self> {
        let handle = bridge.empty_array()?;
        Ok(Self::from_handle(bridge, handle))
    }

    pub fn push(&self, element: &impl AsHandle) -> BridgeResult<()> {
        self.bridge().array_push(self.handle(), element.handle())
    }

    /// The host array's `length`.
    pub fn length(&self) -> BridgeResult<i32> {
        let length = JsString::new(self.bridge(), "length")?;
        self.bridge().get_int_prop(self.handle(), length.handle())
    }
}

impl<'b, H: HostImports> JsDictionary<'b, H> {
    pub fn new(bridge: &'b Bridge<H>) -> BridgeResult<Self> {
        let handle = bridge.empty_dictionary()?;
        Ok(Self::from_handle(bridge, handle))
    }

    pub fn get(&self, key: &JsString<'b, H>) -> BridgeResult<JsObject<'b, H>> {
        let value = self.bridge().get_prop(self.handle(), key.handle())?;
        Ok(JsObject::from_handle(self.bridge(), value))
    }

    pub fn set(&self, key: &JsString<'b, H>, value: &impl AsHandle) -> BridgeResult<()> {
        self.bridge().set_prop(self.handle(), key.handle(), value.handle())
    }

    pub fn get_int(&self, key: &JsString<'b, H>) -> BridgeResult<i32> {
        self.bridge().get_int_prop(self.handle(), key.handle())
    }
}

impl<'b, H: HostImports> HtmlElement<'b, H> {
    /// Append `child` to this element.
    pub fn append(&self, child: &HtmlElement<'b, H>) -> BridgeResult<()> {
        self.bridge().append_child(self.handle(), child.handle())
    }

    pub fn inner_html(&self) -> BridgeResult<JsString<'b, H>> {
        let name = JsString::new(self.bridge(), "innerHTML")?;
        let value = self.bridge().get_prop(self.handle(), name.handle())?;
        Ok(JsString::from_handle(self.bridge(), value))
    }

    pub fn set_inner_html(&self, html: &JsString<'b, H>) -> BridgeResult<()> {
        let name = JsString::new(self.bridge(), "innerHTML")?;
        self.bridge().set_prop(self.handle(), name.handle(), html.handle())
    }
}

impl<'b, H: HostImports> Document<'b, H> {
    /// The host's global document.
    pub fn global(bridge: &'b Bridge<H>) -> BridgeResult<Self> {
        let handle = bridge.get_document()?;
        Ok(Self::from_handle(bridge, handle))
    }

    pub fn create_element(&self, tag: &JsString<'b, H>) -> BridgeResult<HtmlElement<'b, H>> {
        let element = self.bridge().create_element(tag.handle())?;
        Ok(HtmlElement::from_handle(self.bridge(), element))
    }

    /// `document.body`.
    pub fn body(&self) -> BridgeResult<HtmlElement<'b, H>> {
        let name = JsString::new(self.bridge(), "body")?;
        let body = self.bridge().get_prop(self.handle(), name.handle())?;
        Ok(HtmlElement::from_handle(self.bridge(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MockHost, MockObject};

    #[test]
    fn test_wrappers_free_on_drop() {
        let bridge = Bridge::new(MockHost::new());
        {
            let _name = JsString::new(&bridge, "x").unwrap();
            let _array = JsArray::new(&bridge).unwrap();
            assert_eq!(bridge.live_handles(), 2);
        }
        assert_eq!(bridge.live_handles(), 0);
        assert_eq!(bridge.stats().frees, 2);
    }

    #[test]
    fn test_document_body_append() {
        let bridge = Bridge::new(MockHost::new());
        let document = Document::global(&bridge).unwrap();
        let tag = JsString::new(&bridge, "p").unwrap();
        let p = document.create_element(&tag).unwrap();
        document.body().unwrap().append(&p).unwrap();

        let host = bridge.host();
        assert_eq!(host.children(host.body()).len(), 1);
    }

    #[test]
    fn test_inner_html_roundtrip() {
        let bridge = Bridge::new(MockHost::new());
        let document = Document::global(&bridge).unwrap();
        let tag = JsString::new(&bridge, "div").unwrap();
        let div = document.create_element(&tag).unwrap();
        let text = JsString::new(&bridge, "hi").unwrap();
        div.set_inner_html(&text).unwrap();

        let read = div.inner_html().unwrap();
        assert_ne!(read.handle(), text.handle());

        document.body().unwrap().append(&div).unwrap();
        let host = bridge.host();
        let div_ref = host.children(host.body())[0];
        match host.object(div_ref) {
            Some(MockObject::Element { props, .. }) => {
                assert_eq!(host.string_value(props["innerHTML"]).as_deref(), Some("hi"));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_array_push_and_len() {
        let bridge = Bridge::new(MockHost::new());
        let array = JsArray::new(&bridge).unwrap();
        let item = JsString::new(&bridge, "item").unwrap();
        array.push(&item).unwrap();
        array.push(&item).unwrap();
        assert_eq!(array.length().unwrap(), 2);
    }

    #[test]
    fn test_dictionary_set_get() {
        let bridge = Bridge::new(MockHost::new());
        let dict = JsDictionary::new(&bridge).unwrap();
        let key = JsString::new(&bridge, "n").unwrap();
        let value = JsString::new(&bridge, "17").unwrap();
        dict.set(&key, &value).unwrap();

        let read = dict.get(&key).unwrap();
        assert_ne!(read.handle(), value.handle());
        assert_eq!(dict.get_int(&key).unwrap(), 17);
    }

    #[test]
    fn test_temporary_names_do_not_leak() {
        let bridge = Bridge::new(MockHost::new());
        let document = Document::global(&bridge).unwrap();
        let body = document.body().unwrap();
        let html = body.inner_html().unwrap();
        drop(html);
        drop(body);
        drop(document);
        assert_eq!(bridge.live_handles(), 0);
    }
}
