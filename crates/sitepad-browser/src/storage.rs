//! `localStorage` as a slot store.

use sitepad_common::{SlotStore, StorageError};
use wasm_bindgen::JsValue;

/// Slots backed by the window's `localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorageSlots {
    storage: web_sys::Storage,
}

impl LocalStorageSlots {
    /// The current window's `localStorage`.
    ///
    /// Fails when storage is disabled, as in some private browsing modes.
    pub fn from_window() -> Result<Self, StorageError> {
        let storage = gloo_utils::window()
            .local_storage()
            .map_err(unavailable)?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }

    pub fn new(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

impl SlotStore for LocalStorageSlots {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // quota errors surface here: a large site may not fit
        self.storage.set_item(key, value).map_err(unavailable)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(unavailable)
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn unavailable(value: JsValue) -> StorageError {
    StorageError::Unavailable(js_message(&value))
}
