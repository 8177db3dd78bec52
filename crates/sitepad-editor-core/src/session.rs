//! Editor session: where the workspace comes from and where saves go.
//!
//! A session owns the [`Workspace`] together with the slot store the archive
//! snapshot is persisted to. Startup picks between the snapshot left by a
//! previous session and the canonical bundle; every save writes the whole
//! mapping back as a zip data URL.

use sitepad_common::{HttpClient, SlotStore, http::fetch_bytes};

use crate::archive::{from_data_url, read_archive, to_data_url, write_archive};
use crate::content::FileContent;
use crate::error::{SessionError, WorkspaceError};
use crate::workspace::{FileMap, Workspace};

/// The file opened when a session starts.
pub const ENTRY_FILE: &str = "index.html";

/// Word in the entry file replaced by an accent override.
pub const ACCENT_PLACEHOLDER: &str = "cyan";

/// Which archive a session starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionSource {
    /// The snapshot persisted by a previous session.
    Saved,
    /// The site bundle at the configured location.
    Canonical,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Slot the archive snapshot lives in.
    pub session_slot: String,
    /// Where the canonical bundle is fetched from: an http(s) URL or a local path.
    pub bundle_location: String,
    /// Replacement for the first [`ACCENT_PLACEHOLDER`] in the entry file.
    pub accent: Option<String>,
}

impl SessionOptions {
    pub fn from_config(config: &sitepad_common::Config) -> Self {
        Self {
            session_slot: config.session_slot.clone(),
            bundle_location: config.bundle_location.clone(),
            accent: None,
        }
    }

    pub fn with_accent(mut self, accent: impl Into<String>) -> Self {
        self.accent = Some(accent.into());
        self
    }
}

/// Read the canonical bundle's bytes.
pub async fn load_bundle(
    client: &impl HttpClient,
    location: &str,
) -> Result<Vec<u8>, SessionError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return fetch_bytes(client, location)
            .await
            .map_err(|source| SessionError::Fetch {
                location: location.to_owned(),
                source,
            });
    }
    std::fs::read(location).map_err(|e| SessionError::Fetch {
        location: location.to_owned(),
        source: e.into(),
    })
}

pub struct EditorSession<S> {
    workspace: Workspace,
    store: S,
    session_slot: String,
}

impl<S: SlotStore> EditorSession<S> {
    /// Start a session, asking `choose` which archive to use when a saved
    /// snapshot exists.
    ///
    /// Without a snapshot the canonical bundle is used and `choose` is never
    /// called.
    pub async fn open(
        store: S,
        client: &impl HttpClient,
        options: SessionOptions,
        choose: impl FnOnce() -> SessionSource,
    ) -> Result<Self, SessionError> {
        let saved = match store.get(&options.session_slot)? {
            Some(url) if !url.is_empty() => Some(url),
            _ => None,
        };
        let source = match saved {
            Some(_) => choose(),
            None => SessionSource::Canonical,
        };
        let bytes = match (source, saved) {
            (SessionSource::Saved, Some(url)) => {
                tracing::info!(slot = %options.session_slot, "restoring previous session");
                from_data_url(&url)?
            }
            _ => {
                tracing::info!(location = %options.bundle_location, "loading site bundle");
                load_bundle(client, &options.bundle_location).await?
            }
        };
        let mut session = Self::from_archive(&bytes, store, options.session_slot)?;
        if let Some(accent) = options.accent.as_deref() {
            session.apply_accent(accent)?;
        }
        Ok(session)
    }

    /// Start a session from archive bytes already in hand.
    pub fn from_archive(
        bytes: &[u8],
        store: S,
        session_slot: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let files = read_archive(bytes)?;
        Ok(Self::from_files(files, store, session_slot))
    }

    /// Start a session from a mapping, opening the entry file when present.
    pub fn from_files(files: FileMap, store: S, session_slot: impl Into<String>) -> Self {
        let mut workspace = Workspace::from_files(files);
        if workspace.contains(ENTRY_FILE) {
            // contains() was just checked, so open cannot fail
            let _ = workspace.open_file(ENTRY_FILE);
        }
        Self {
            workspace,
            store,
            session_slot: session_slot.into(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The workspace alongside mutable access to the store.
    pub fn split_mut(&mut self) -> (&Workspace, &mut S) {
        (&self.workspace, &mut self.store)
    }

    pub fn into_parts(self) -> (Workspace, S) {
        (self.workspace, self.store)
    }

    /// Replace the first accent placeholder in the entry file.
    ///
    /// The change is a programmatic load: the entry file stays clean.
    pub fn apply_accent(&mut self, accent: &str) -> Result<bool, SessionError> {
        if !self.workspace.contains(ENTRY_FILE) {
            return Ok(false);
        }
        let replaced = self
            .workspace
            .substitute_first(ENTRY_FILE, ACCENT_PLACEHOLDER, accent)?;
        tracing::debug!(accent, replaced, "accent override");
        Ok(replaced)
    }

    /// Save `content` to `path` and persist the whole mapping.
    pub fn save(&mut self, path: &str, content: impl Into<String>) -> Result<(), SessionError> {
        self.workspace.save(path, content)?;
        self.persist()
    }

    /// Save the active file's live text and persist. Returns the saved path.
    pub fn save_active(&mut self) -> Result<String, SessionError> {
        let path = self.workspace.save_active()?;
        self.persist()?;
        tracing::info!(path = %path, "saved");
        Ok(path)
    }

    /// Write the current mapping to the session slot.
    pub fn persist(&mut self) -> Result<(), SessionError> {
        let archive = write_archive(self.workspace.files())?;
        self.store.set(&self.session_slot, &to_data_url(&archive))?;
        tracing::debug!(slot = %self.session_slot, bytes = archive.len(), "session persisted");
        Ok(())
    }

    /// Forget the persisted snapshot. The next start uses the canonical bundle.
    pub fn clear_saved(&mut self) -> Result<(), SessionError> {
        self.store.remove(&self.session_slot)?;
        Ok(())
    }

    /// Open `path` for editing, returning its text.
    pub fn open_text(&mut self, path: &str) -> Result<String, SessionError> {
        match self.workspace.open_file(path)? {
            FileContent::Text(text) => Ok(text),
            FileContent::Binary(_) => Err(WorkspaceError::NotText(path.to_owned()).into()),
        }
    }
}
