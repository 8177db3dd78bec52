//! Browser layer for the sitepad editor.
//!
//! Plugs the platform-neutral crates into the browser. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `storage`: `localStorage` slot store for the session snapshot and site map
//! - `resources`: object URLs over `Blob`s as preview handles
//! - `dialogs`: sign-in popup plus `prompt`/`confirm` for the publish flow
//! - `explorer`: the file tree with its active and dirty markers
//!
//! [`BrowserEditor`] ties them to the controls on the page.
//!
//! # Re-exports
//!
//! This crate re-exports `sitepad-editor-core` for convenience.

pub use sitepad_editor_core;
pub use sitepad_editor_core::*;

pub mod dialogs;
pub mod explorer;
pub mod resources;
pub mod storage;

pub use dialogs::{DialogPrompt, PopupAuthWindow, choose_session_source};
pub use explorer::{ExplorerAction, action_for, render_explorer};
pub use resources::BlobResourceStore;
pub use storage::LocalStorageSlots;

use sitepad_common::{Config, SitepadHttpClient};
use sitepad_renderer::publish::{PublishError, Publisher};
use sitepad_renderer::{
    PreviewError, ResourceHandle, SiteMap, build_and_record_preview, build_archive,
    revoke_site_map,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

/// Query parameter carrying the accent override.
pub const ACCENT_PARAM: &str = "q";

/// The editor as it runs in a page.
pub struct BrowserEditor {
    session: EditorSession<LocalStorageSlots>,
    config: Config,
    resources: BlobResourceStore,
    preview: Option<SiteMap>,
    publisher: Publisher<SitepadHttpClient>,
}

impl BrowserEditor {
    /// Load the workspace, asking the user whether to restore a previous
    /// session when one is stored, and render the file explorer.
    pub async fn start(config: Config) -> Result<Self, SessionError> {
        let store = LocalStorageSlots::from_window()?;
        let client = SitepadHttpClient::default();

        let mut options = SessionOptions::from_config(&config);
        options.bundle_location = resolve_url(&config.bundle_location);
        options.accent = query_param(ACCENT_PARAM);

        let session = EditorSession::open(store, &client, options, choose_session_source).await?;
        let editor = Self::new(session, config, client);
        editor.render_explorer();
        Ok(editor)
    }

    /// Wrap a session that is already open.
    pub fn new(
        session: EditorSession<LocalStorageSlots>,
        config: Config,
        client: SitepadHttpClient,
    ) -> Self {
        let publisher = Publisher::new(client, &config);
        Self {
            session,
            config,
            resources: BlobResourceStore::new(),
            preview: None,
            publisher,
        }
    }

    pub fn session(&self) -> &EditorSession<LocalStorageSlots> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession<LocalStorageSlots> {
        &mut self.session
    }

    /// Redraw the file explorer from the workspace.
    pub fn render_explorer(&self) {
        if let Err(e) = render_explorer(self.session.workspace()) {
            tracing::warn!(error = %storage::js_message(&e), "could not render file explorer");
        }
    }

    /// Make `path` the active file and return its content for the editing
    /// surface. Loading it never marks it dirty.
    pub fn open_file(&mut self, path: &str) -> Result<FileContent, SessionError> {
        let content = self.session.workspace_mut().open_file(path)?;
        explorer::set_active(path);
        Ok(content)
    }

    /// Record the editing surface's new text for the active file and update
    /// its dirty marker.
    pub fn on_content_changed(&mut self, text: &str) -> Result<DirtyState, SessionError> {
        let workspace = self.session.workspace_mut();
        let path = workspace
            .active_path()
            .ok_or(WorkspaceError::NoActiveFile)?
            .to_owned();
        let state = workspace.edit_content(&path, text)?;
        explorer::set_dirty(&path, state.is_dirty());
        Ok(state)
    }

    /// Save the active file and flash the outcome on the save control.
    pub fn save(&mut self) -> Feedback {
        let result = self.session.save_active();
        match &result {
            Ok(path) => explorer::set_dirty(path, false),
            Err(e) => tracing::warn!(error = %e, "save failed"),
        }
        let feedback = Feedback::for_save(&result);
        flash(Control::Save, feedback);
        feedback
    }

    /// Materialize the site and open it in a new tab.
    ///
    /// Handles of the previous preview are revoked first. Files of unknown
    /// type are logged and left out.
    pub fn preview(&mut self) -> Result<ResourceHandle, PreviewError> {
        let result = self.open_preview();
        flash(Control::Preview, Feedback::outcome(&result, Feedback::OPENED));
        result
    }

    fn open_preview(&mut self) -> Result<ResourceHandle, PreviewError> {
        if let Some(previous) = self.preview.take() {
            revoke_site_map(&previous, &mut self.resources);
        }
        let (workspace, slots) = self.session.split_mut();
        let build = build_and_record_preview(
            workspace.files(),
            &mut self.resources,
            slots,
            &self.config.site_map_slot,
        )?;
        let entry = build.entry_point()?.clone();
        self.preview = Some(build.site_map);

        if let Err(e) = gloo_utils::window().open_with_url_and_target(entry.as_str(), "_blank") {
            tracing::warn!(error = %storage::js_message(&e), "could not open preview");
        }
        Ok(entry)
    }

    /// Build the archive and hand it to the browser as a download.
    pub fn download(&self) -> Result<(), PreviewError> {
        let result = self.start_download();
        flash(Control::Download, Feedback::outcome(&result, Feedback::DOWNLOADED));
        result
    }

    fn start_download(&self) -> Result<(), PreviewError> {
        let archive = build_archive(self.session.workspace().files())?;
        let to_err = |e: wasm_bindgen::JsValue| PreviewError::Resource {
            address: archive.file_name.to_owned(),
            reason: storage::js_message(&e),
        };

        let blob = resources::make_blob(sitepad_renderer::SiteArchive::MIME_TYPE, &archive.bytes)
            .map_err(to_err)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(to_err)?;
        let link = gloo_utils::document()
            .create_element("a")
            .map_err(to_err)?
            .unchecked_into::<web_sys::HtmlAnchorElement>();
        link.set_href(&url);
        link.set_download(archive.file_name);
        link.click();
        let _ = web_sys::Url::revoke_object_url(&url);
        Ok(())
    }

    /// Publish the saved workspace, signing in through a popup if needed.
    pub async fn publish(&mut self, subdomain: Option<&str>) -> Result<String, PublishError> {
        let result = self
            .publisher
            .publish(
                self.session.workspace().files(),
                subdomain,
                &mut PopupAuthWindow::new(),
                &mut DialogPrompt,
            )
            .await;
        flash(Control::Publish, Feedback::outcome(&result, Feedback::PUBLISHED));
        result
    }

    /// Create a file, at the root or inside `folder`, open it and redraw the
    /// explorer.
    pub fn new_file(&mut self, folder: Option<&str>, name: &str) -> Result<String, SessionError> {
        let control = match folder {
            Some(_) => Control::NewFileInFolder,
            None => Control::NewFile,
        };
        let result = self.create_file(folder, name);
        match &result {
            Ok(_) => self.render_explorer(),
            Err(e) => tracing::warn!(error = %e, "could not create file"),
        }
        flash(control, Feedback::outcome(&result, Feedback::CREATED));
        result
    }

    fn create_file(&mut self, folder: Option<&str>, name: &str) -> Result<String, SessionError> {
        let workspace = self.session.workspace_mut();
        match folder {
            Some(folder) => workspace.create_file_in(folder, name, "")?,
            None => workspace.create_file(name, "")?,
        };
        Ok(workspace.active_path().unwrap_or(name).to_owned())
    }
}

/// Show `feedback` on the element bound to `control`, then restore its label.
pub fn flash(control: Control, feedback: Feedback) {
    let Some(element) = gloo_utils::document().get_element_by_id(control.id()) else {
        return;
    };
    element.set_text_content(Some(feedback.text));

    let restore = Closure::once_into_js(move || {
        element.set_text_content(Some(control.label()));
    });
    let millis = i32::try_from(feedback.duration.as_millis()).unwrap_or(i32::MAX);
    if let Err(e) = gloo_utils::window()
        .set_timeout_with_callback_and_timeout_and_arguments_0(restore.unchecked_ref(), millis)
    {
        tracing::debug!(error = %storage::js_message(&e), "could not schedule label restore");
    }
}

/// Resolve `location` against the page URL. Absolute URLs pass through.
pub fn resolve_url(location: &str) -> String {
    let base = gloo_utils::window().location().href().unwrap_or_default();
    web_sys::Url::new_with_base(location, &base)
        .map(|url| url.href())
        .unwrap_or_else(|_| location.to_owned())
}

/// A parameter of the page's query string.
pub fn query_param(name: &str) -> Option<String> {
    let search = gloo_utils::window().location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get(name)
        .filter(|value| !value.is_empty())
}
