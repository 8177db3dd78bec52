//! Preview materialization.
//!
//! Turns the workspace mapping into a set of resource handles that together
//! form a browsable site. Non-HTML files are materialized first; HTML
//! documents are then rewritten against the addresses already built, so a
//! page can only ever point at resources that exist.

use sitepad_common::SlotStore;
use sitepad_editor_core::{FileContent, FileKind, FileMap};

use crate::error::PreviewError;
use crate::resource::{ResourceHandle, ResourceStore};
use crate::rewrite::rewrite_links;
use crate::site_map::SiteMap;

/// Outcome of a preview build.
///
/// Per-file failures do not stop the build; they are collected in `errors`
/// and the remaining files are still materialized.
#[derive(Debug, Default)]
pub struct PreviewBuild {
    pub site_map: SiteMap,
    pub errors: Vec<PreviewError>,
}

impl PreviewBuild {
    /// Handle to open the preview at.
    pub fn entry_point(&self) -> Result<&ResourceHandle, PreviewError> {
        self.site_map.entry_point().ok_or(PreviewError::NoEntryPoint)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Materialize every file in `files` through `store`.
pub fn build_preview(files: &FileMap, store: &mut impl ResourceStore) -> PreviewBuild {
    let mut build = PreviewBuild::default();
    let entries = files.iter().filter(|(path, _)| !path.ends_with('/'));

    let (pages, assets): (Vec<_>, Vec<_>) =
        entries.partition(|(path, _)| FileKind::from_path(path) == Some(FileKind::Html));

    for (path, content) in assets {
        let Some(kind) = FileKind::from_path(path) else {
            let extension = path
                .rsplit('/')
                .next()
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_owned())
                .unwrap_or_default();
            tracing::error!(path = %path, extension = %extension, "unknown file type");
            build.errors.push(PreviewError::UnknownFileType {
                path: path.clone(),
                extension,
            });
            continue;
        };
        let address = SiteMap::address_for(path);
        match store.create(&address, kind.mime_type(), content.as_bytes()) {
            Ok(handle) => {
                build.site_map.insert(address, handle);
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "could not materialize file");
                build.errors.push(e);
            }
        }
    }

    for (path, content) in pages {
        let document = match content {
            FileContent::Text(text) => rewrite_links(text, &build.site_map),
            FileContent::Binary(bytes) => {
                rewrite_links(&String::from_utf8_lossy(bytes), &build.site_map)
            }
        };
        let address = SiteMap::address_for(path);
        match store.create(&address, FileKind::Html.mime_type(), document.as_bytes()) {
            Ok(handle) => {
                build.site_map.insert(address, handle);
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "could not materialize page");
                build.errors.push(e);
            }
        }
    }

    tracing::debug!(
        resources = build.site_map.len(),
        errors = build.errors.len(),
        "preview built"
    );
    build
}

/// Build a preview and record its site map in `slot`.
pub fn build_and_record_preview(
    files: &FileMap,
    resources: &mut impl ResourceStore,
    slots: &mut impl SlotStore,
    slot: &str,
) -> Result<PreviewBuild, PreviewError> {
    let build = build_preview(files, resources);
    build.site_map.store(slots, slot)?;
    Ok(build)
}

/// Release every handle of an earlier build.
pub fn revoke_site_map(site_map: &SiteMap, store: &mut impl ResourceStore) {
    for handle in site_map.handles() {
        store.revoke(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryResourceStore;

    fn text(store: &MemoryResourceStore, handle: &ResourceHandle) -> String {
        store.get(handle).and_then(|r| r.text()).unwrap().to_owned()
    }

    #[test]
    fn page_links_point_at_built_assets() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<img src='a.png'>".into());
        files.insert("a.png".into(), FileContent::from(vec![0x89, b'P', b'N', b'G']));
        let mut store = MemoryResourceStore::new();

        let build = build_preview(&files, &mut store);
        assert!(build.is_clean());

        let png = build.site_map.get("/a.png").unwrap();
        assert_eq!(store.get(png).unwrap().mime, "image/png");

        let page = text(&store, build.entry_point().unwrap());
        assert_ne!(page, "<img src='a.png'>");
        assert_eq!(page, format!("<img src='{png}'>"));
    }

    #[test]
    fn unknown_types_are_reported_and_skipped() {
        let mut files = FileMap::new();
        files.insert("data.json".into(), "{}".into());
        files.insert("README".into(), "hi".into());
        files.insert("style.css".into(), "a {}".into());
        files.insert("assets/".into(), "".into());
        let mut store = MemoryResourceStore::new();

        let build = build_preview(&files, &mut store);
        assert_eq!(build.site_map.len(), 1);
        assert!(build.site_map.contains("/style.css"));
        let unknown: Vec<_> = build
            .errors
            .iter()
            .map(|e| match e {
                PreviewError::UnknownFileType { path, extension } => {
                    (path.as_str(), extension.as_str())
                }
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(unknown, vec![("data.json", "json"), ("README", "")]);
        assert!(matches!(build.entry_point(), Err(PreviewError::NoEntryPoint)));
    }

    #[test]
    fn mime_types_follow_the_file_kind() {
        let mut files = FileMap::new();
        files.insert("app.js".into(), "".into());
        files.insert("notes.md".into(), "".into());
        files.insert("photo.JPG".into(), FileContent::from(vec![0xff, 0xd8]));
        let mut store = MemoryResourceStore::new();
        let build = build_preview(&files, &mut store);

        let mime = |address: &str| {
            let handle = build.site_map.get(address).unwrap();
            store.get(handle).unwrap().mime.clone()
        };
        assert_eq!(mime("/app.js"), "text/js");
        assert_eq!(mime("/notes.md"), "text/markdown");
        assert_eq!(mime("/photo.JPG"), "image/jpg");
    }

    #[test]
    fn recorded_site_map_matches_the_build() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<link href='s.css'>".into());
        files.insert("s.css".into(), "".into());
        let mut store = MemoryResourceStore::new();
        let mut slots = sitepad_common::MemorySlotStore::new();

        let build = build_and_record_preview(&files, &mut store, &mut slots, "siteMap").unwrap();
        let recorded = SiteMap::load(&slots, "siteMap").unwrap().unwrap();
        assert_eq!(recorded, build.site_map);
        assert_eq!(
            recorded.iter().map(|(address, _)| address).collect::<Vec<_>>(),
            vec!["/s.css", "/index.html"]
        );
    }

    #[test]
    fn revoke_releases_every_handle() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<p>hi</p>".into());
        files.insert("style.css".into(), "".into());
        let mut store = MemoryResourceStore::new();
        let build = build_preview(&files, &mut store);
        assert_eq!(store.len(), 2);
        revoke_site_map(&build.site_map, &mut store);
        assert!(store.is_empty());
    }
}
