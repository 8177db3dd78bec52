//! Object URLs over `Blob`s as preview resource handles.

use sitepad_renderer::{PreviewError, ResourceHandle, ResourceStore};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, Url};

use crate::storage::js_message;

/// Mints `blob:` URLs that live until revoked or the page unloads.
#[derive(Debug, Default)]
pub struct BlobResourceStore;

impl BlobResourceStore {
    pub fn new() -> Self {
        Self
    }
}

/// Wrap bytes in a `Blob` of the given type.
pub fn make_blob(mime: &str, bytes: &[u8]) -> Result<Blob, JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::of1(&array);
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

impl ResourceStore for BlobResourceStore {
    fn create(
        &mut self,
        address: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<ResourceHandle, PreviewError> {
        let to_err = |e: JsValue| PreviewError::Resource {
            address: address.to_owned(),
            reason: js_message(&e),
        };
        let blob = make_blob(mime, bytes).map_err(to_err)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(to_err)?;
        Ok(ResourceHandle::new(url))
    }

    fn revoke(&mut self, handle: &ResourceHandle) {
        if let Err(e) = Url::revoke_object_url(handle.as_str()) {
            tracing::debug!(handle = %handle, error = %js_message(&e), "revoke failed");
        }
    }
}
