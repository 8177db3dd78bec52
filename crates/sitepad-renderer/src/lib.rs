//! sitepad renderer
//!
//! Turns a workspace into something a browser can show: a preview made of
//! resource handles with the site's static links rewritten to point at them,
//! a portable archive, or a site published to the hosting service.

pub mod archive;
pub mod error;
pub mod preview;
pub mod publish;
pub mod resource;
pub mod rewrite;
pub mod site_map;

pub use archive::{SiteArchive, build_archive};
pub use error::PreviewError;
pub use preview::{PreviewBuild, build_and_record_preview, build_preview, revoke_site_map};
pub use publish::{PublishError, Publisher};
pub use resource::{DirResourceStore, MemoryResourceStore, ResourceHandle, ResourceStore};
pub use rewrite::rewrite_links;
pub use site_map::SiteMap;
