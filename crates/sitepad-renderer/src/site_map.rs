//! Address to handle mapping produced by a preview build.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sitepad_common::SlotStore;

use crate::error::PreviewError;
use crate::resource::ResourceHandle;

/// Address the preview is opened at.
pub const ENTRY_ADDRESS: &str = "/index.html";

/// Site-relative addresses (`/` + path) to resource handles, in build order.
///
/// Serialized as a JSON array of `[address, handle]` pairs. The handles do not
/// survive a reload, so a deserialized map is only a record of the last build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, ResourceHandle)>", into = "Vec<(String, ResourceHandle)>")]
pub struct SiteMap {
    entries: IndexMap<String, ResourceHandle>,
}

impl SiteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a workspace path is served at.
    pub fn address_for(path: &str) -> String {
        if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        }
    }

    pub fn insert(
        &mut self,
        address: impl Into<String>,
        handle: ResourceHandle,
    ) -> Option<ResourceHandle> {
        self.entries.insert(address.into(), handle)
    }

    pub fn get(&self, address: &str) -> Option<&ResourceHandle> {
        self.entries.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    /// Handle of `/index.html`, where the preview starts.
    pub fn entry_point(&self) -> Option<&ResourceHandle> {
        self.get(ENTRY_ADDRESS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceHandle)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn handles(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.entries.values()
    }

    pub fn to_json(&self) -> Result<String, PreviewError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PreviewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Record this map in `slot`.
    pub fn store(&self, store: &mut impl SlotStore, slot: &str) -> Result<(), PreviewError> {
        store.set(slot, &self.to_json()?)?;
        Ok(())
    }

    /// The map recorded in `slot` by an earlier build, if any.
    pub fn load(store: &impl SlotStore, slot: &str) -> Result<Option<Self>, PreviewError> {
        match store.get(slot)? {
            Some(json) => Ok(Some(Self::from_json(&json)?)),
            None => Ok(None),
        }
    }
}

impl From<Vec<(String, ResourceHandle)>> for SiteMap {
    fn from(pairs: Vec<(String, ResourceHandle)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }
}

impl From<SiteMap> for Vec<(String, ResourceHandle)> {
    fn from(map: SiteMap) -> Self {
        map.entries.into_iter().collect()
    }
}
