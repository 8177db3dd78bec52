//! Resource handles: ephemeral URLs that stand in for site files in a preview.
//!
//! In the browser a handle is an object URL over a `Blob`; natively it is a
//! `file://` URL into a scratch directory. Either way a handle only lives as
//! long as the store that minted it.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::PreviewError;

/// A URL for materialized content, valid for the lifetime of its store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mints resource handles for typed content.
pub trait ResourceStore {
    /// Materialize `bytes` as a resource of type `mime` for the site address
    /// `address` (always starting with `/`).
    fn create(
        &mut self,
        address: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<ResourceHandle, PreviewError>;

    /// Release a handle minted earlier. Unknown handles are ignored.
    fn revoke(&mut self, handle: &ResourceHandle);
}

impl<S: ResourceStore + ?Sized> ResourceStore for &mut S {
    fn create(
        &mut self,
        address: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<ResourceHandle, PreviewError> {
        (**self).create(address, mime, bytes)
    }

    fn revoke(&mut self, handle: &ResourceHandle) {
        (**self).revoke(handle)
    }
}

/// A resource held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub address: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl Resource {
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Keeps resources in a map under `blob:sitepad/<uuid>` handles.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    resources: HashMap<ResourceHandle, Resource>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &ResourceHandle) -> Option<&Resource> {
        self.resources.get(handle)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceStore for MemoryResourceStore {
    fn create(
        &mut self,
        address: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<ResourceHandle, PreviewError> {
        let handle = ResourceHandle(format!("blob:sitepad/{}", uuid::Uuid::new_v4()));
        self.resources.insert(
            handle.clone(),
            Resource {
                address: address.to_owned(),
                mime: mime.to_owned(),
                bytes: Bytes::copy_from_slice(bytes),
            },
        );
        Ok(handle)
    }

    fn revoke(&mut self, handle: &ResourceHandle) {
        self.resources.remove(handle);
    }
}

/// Writes each resource into a directory, mirroring the site layout, and
/// hands out `file://` URLs.
#[derive(Debug, Clone)]
pub struct DirResourceStore {
    root: PathBuf,
}

impl DirResourceStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, address: &str) -> Result<PathBuf, PreviewError> {
        let relative = address.trim_start_matches('/');
        if relative.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
            return Err(PreviewError::Resource {
                address: address.to_owned(),
                reason: "address does not name a file inside the site".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceStore for DirResourceStore {
    fn create(
        &mut self,
        address: &str,
        _mime: &str,
        bytes: &[u8],
    ) -> Result<ResourceHandle, PreviewError> {
        let path = self.path_for(address)?;
        let io_err = |e: std::io::Error| PreviewError::Resource {
            address: address.to_owned(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, bytes).map_err(io_err)?;
        let absolute = fs::canonicalize(&path).unwrap_or(path);
        Ok(ResourceHandle(format!("file://{}", absolute.display())))
    }

    fn revoke(&mut self, handle: &ResourceHandle) {
        if let Some(path) = handle.as_str().strip_prefix("file://") {
            if let Err(e) = fs::remove_file(path) {
                tracing::debug!(path, error = %e, "could not remove preview file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_handles_are_unique_and_revocable() {
        let mut store = MemoryResourceStore::new();
        let a = store.create("/a.css", "text/css", b"a {}").unwrap();
        let b = store.create("/a.css", "text/css", b"a {}").unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:sitepad/"));
        assert_eq!(store.get(&a).and_then(Resource::text), Some("a {}"));

        store.revoke(&a);
        assert!(store.get(&a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dir_store_mirrors_the_site_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirResourceStore::new(dir.path());
        let handle = store
            .create("/css/site.css", "text/css", b"body {}")
            .unwrap();
        assert!(handle.as_str().starts_with("file://"));
        assert!(handle.as_str().ends_with("css/site.css"));
        let written = fs::read_to_string(dir.path().join("css/site.css")).unwrap();
        assert_eq!(written, "body {}");

        store.revoke(&handle);
        assert!(!dir.path().join("css/site.css").exists());
    }

    #[test]
    fn dir_store_refuses_to_escape_its_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirResourceStore::new(dir.path());
        let err = store.create("/../evil.js", "text/js", b"").unwrap_err();
        assert!(matches!(err, PreviewError::Resource { .. }));
    }
}
