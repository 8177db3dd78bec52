//! The workspace: the site's files plus the bookkeeping around editing them.
//!
//! Three maps are kept side by side, all keyed by path:
//! - `files`: the saved mapping, in archive enumeration order. This is what
//!   gets previewed, archived, persisted and published.
//! - `originals`: the content each path had when it was last loaded or saved.
//! - `drafts`: live editor text that has not been saved yet.
//!
//! Dirtiness is never stored. A path is dirty exactly when it has a draft that
//! differs from its original snapshot.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::content::FileContent;
use crate::error::WorkspaceError;
use crate::kind::FileKind;

/// Path to content mapping in archive enumeration order.
pub type FileMap = IndexMap<String, FileContent>;

/// Result of comparing live content against its snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyState {
    Clean,
    Dirty,
}

impl DirtyState {
    pub fn is_dirty(self) -> bool {
        self == DirtyState::Dirty
    }
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    files: FileMap,
    originals: HashMap<String, FileContent>,
    drafts: HashMap<String, String>,
    active: Option<String>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace from a freshly loaded mapping.
    ///
    /// No snapshots are recorded yet; each path gets one when it is first opened.
    pub fn from_files(files: FileMap) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn into_files(self) -> FileMap {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Saved content of a path.
    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_kind(&self) -> Option<FileKind> {
        self.active_path().and_then(FileKind::from_path)
    }

    /// The snapshot a path's live content is compared against.
    pub fn snapshot(&self, path: &str) -> Option<&FileContent> {
        self.originals.get(path)
    }

    /// Live content: the unsaved draft if there is one, otherwise the saved content.
    pub fn live_content(&self, path: &str) -> Option<FileContent> {
        match self.drafts.get(path) {
            Some(draft) => Some(FileContent::Text(draft.clone())),
            None => self.files.get(path).cloned(),
        }
    }

    /// Live text of the active file, if it is a text file.
    pub fn active_text(&self) -> Option<&str> {
        let path = self.active_path()?;
        match self.drafts.get(path) {
            Some(draft) => Some(draft.as_str()),
            None => self.files.get(path).and_then(FileContent::as_text),
        }
    }

    /// Switch the editing context to `path` and return its live content.
    ///
    /// The content present at first open becomes the path's snapshot. Opening a
    /// path never marks it dirty.
    pub fn open_file(&mut self, path: &str) -> Result<FileContent, WorkspaceError> {
        let content = self
            .files
            .get(path)
            .ok_or_else(|| WorkspaceError::NotFound(path.to_owned()))?;
        self.originals
            .entry(path.to_owned())
            .or_insert_with(|| content.clone());
        self.active = Some(path.to_owned());
        tracing::debug!(path, "opened file");
        Ok(self.live_content(path).unwrap_or_default())
    }

    /// Record a user edit of `path` and report whether it now differs from its snapshot.
    pub fn edit_content(
        &mut self,
        path: &str,
        content: impl Into<String>,
    ) -> Result<DirtyState, WorkspaceError> {
        match self.files.get(path) {
            None => return Err(WorkspaceError::NotFound(path.to_owned())),
            Some(FileContent::Binary(_)) => return Err(WorkspaceError::NotText(path.to_owned())),
            Some(FileContent::Text(_)) => {}
        }
        let was_dirty = self.is_dirty(path);
        self.drafts.insert(path.to_owned(), content.into());
        let state = self.dirty_state(path);
        if state.is_dirty() != was_dirty {
            tracing::debug!(path, dirty = state.is_dirty(), "dirty state changed");
        }
        Ok(state)
    }

    /// Silently replace a path's content, for programmatic loads.
    ///
    /// The snapshot moves with the content and any draft is discarded, so the
    /// path is clean afterwards.
    pub fn replace_content(&mut self, path: &str, content: impl Into<FileContent>) {
        let content = content.into();
        self.originals.insert(path.to_owned(), content.clone());
        self.drafts.remove(path);
        self.files.insert(path.to_owned(), content);
    }

    /// Write `content` to `path` and make it the new snapshot.
    ///
    /// Images stay binary: saving text over one, or to an image path, is
    /// rejected with [`WorkspaceError::NotText`].
    pub fn save(&mut self, path: &str, content: impl Into<String>) -> Result<(), WorkspaceError> {
        if path.is_empty() {
            return Err(WorkspaceError::NoActiveFile);
        }
        validate_path(path)?;
        let binary = matches!(self.files.get(path), Some(FileContent::Binary(_)))
            || FileKind::from_path(path).is_some_and(FileKind::is_binary);
        if binary {
            return Err(WorkspaceError::NotText(path.to_owned()));
        }
        let content = FileContent::Text(content.into());
        self.originals.insert(path.to_owned(), content.clone());
        self.drafts.remove(path);
        self.files.insert(path.to_owned(), content);
        tracing::debug!(path, "saved file");
        Ok(())
    }

    /// Save the active file's live text. Returns the saved path.
    pub fn save_active(&mut self) -> Result<String, WorkspaceError> {
        let path = self.active.clone().ok_or(WorkspaceError::NoActiveFile)?;
        let text = match self.live_content(&path) {
            Some(FileContent::Text(text)) => text,
            Some(FileContent::Binary(_)) => return Err(WorkspaceError::NotText(path)),
            None => String::new(),
        };
        self.save(&path, text)?;
        Ok(path)
    }

    /// Throw away unsaved edits of `path`.
    pub fn revert(&mut self, path: &str) -> Option<FileContent> {
        self.drafts.remove(path);
        self.files.get(path).cloned()
    }

    /// Add a new file and open it.
    ///
    /// Creating a path that already exists is rejected and leaves the mapping
    /// untouched.
    pub fn create_file(
        &mut self,
        path: &str,
        initial: impl Into<String>,
    ) -> Result<FileContent, WorkspaceError> {
        validate_path(path)?;
        if self.files.contains_key(path) {
            return Err(WorkspaceError::AlreadyExists(path.to_owned()));
        }
        let content = FileContent::Text(initial.into());
        self.files.insert(path.to_owned(), content.clone());
        self.originals.insert(path.to_owned(), content);
        tracing::debug!(path, "created file");
        self.open_file(path)
    }

    /// Add a new file named `name` inside `folder` and open it.
    pub fn create_file_in(
        &mut self,
        folder: &str,
        name: &str,
        initial: impl Into<String>,
    ) -> Result<FileContent, WorkspaceError> {
        let folder = folder.trim_end_matches('/');
        if folder.is_empty() {
            return self.create_file(name, initial);
        }
        self.create_file(&format!("{folder}/{name}"), initial)
    }

    /// Replace the first occurrence of `needle` in a text file, silently.
    ///
    /// Returns whether anything was replaced.
    pub fn substitute_first(
        &mut self,
        path: &str,
        needle: &str,
        replacement: &str,
    ) -> Result<bool, WorkspaceError> {
        let text = match self.files.get(path) {
            None => return Err(WorkspaceError::NotFound(path.to_owned())),
            Some(FileContent::Binary(_)) => return Err(WorkspaceError::NotText(path.to_owned())),
            Some(FileContent::Text(text)) => text,
        };
        if !text.contains(needle) {
            return Ok(false);
        }
        let replaced = text.replacen(needle, replacement, 1);
        self.replace_content(path, replaced);
        Ok(true)
    }

    pub fn dirty_state(&self, path: &str) -> DirtyState {
        if self.is_dirty(path) {
            DirtyState::Dirty
        } else {
            DirtyState::Clean
        }
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        let Some(draft) = self.drafts.get(path) else {
            return false;
        };
        match self.originals.get(path) {
            Some(FileContent::Text(original)) => original != draft,
            Some(FileContent::Binary(_)) => true,
            None => !draft.is_empty(),
        }
    }

    /// Dirty paths in mapping order.
    pub fn dirty_files(&self) -> Vec<&str> {
        self.paths().filter(|path| self.is_dirty(path)).collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.drafts.keys().any(|path| self.is_dirty(path))
    }
}

fn validate_path(path: &str) -> Result<(), WorkspaceError> {
    let invalid = |reason| {
        Err(WorkspaceError::InvalidPath {
            path: path.to_owned(),
            reason,
        })
    };
    if path.trim().is_empty() {
        return invalid("path is empty");
    }
    if path.starts_with('/') {
        return invalid("paths are relative to the site root and must not start with '/'");
    }
    if path.ends_with('/') {
        return invalid("path names a folder, not a file");
    }
    if path.split('/').any(|segment| segment.is_empty()) {
        return invalid("path contains an empty folder name");
    }
    Ok(())
}
