//! sitepad-editor-core: workspace state for the site editor, free of any UI.
//!
//! This crate provides:
//! - `Workspace` - the path to content mapping with snapshots, drafts and dirty tracking
//! - `FileKind` - the closed set of recognised file types with icon, mode and MIME
//! - `FolderNode` - the folder tree projection used by file browsers
//! - Archive codec (zip and data URL) and the `EditorSession` that loads and persists it
//! - `Control` and `Feedback` for the user-facing actions

pub mod archive;
pub mod content;
pub mod controls;
pub mod error;
pub mod kind;
pub mod session;
pub mod tree;
pub mod workspace;

pub use archive::{DOWNLOAD_FILE_NAME, from_data_url, read_archive, to_data_url, write_archive};
pub use content::FileContent;
pub use controls::{Control, Feedback};
pub use error::{ArchiveError, SessionError, WorkspaceError};
pub use kind::{FOLDER_ICON, FOLDER_OPEN_ICON, FileKind, UNKNOWN_FILE_ICON, icon_for};
pub use session::{EditorSession, SessionOptions, SessionSource, load_bundle};
pub use tree::{FolderNode, TreeRow, render_tree};
pub use workspace::{DirtyState, FileMap, Workspace};
