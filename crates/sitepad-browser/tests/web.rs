//! WASM browser tests for sitepad-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use sitepad_browser::explorer::{ACTIVE_CLASS, DIRTY_CLASS, EXPLORER_ID};
use sitepad_browser::{
    BlobResourceStore, BrowserEditor, ExplorerAction, LocalStorageSlots, action_for, query_param,
    resolve_url,
};
use sitepad_common::{Config, SitepadHttpClient, SlotStore};
use sitepad_editor_core::{
    Control, DirtyState, EditorSession, Feedback, FileContent, FileMap, SessionError,
};
use web_sys::Element;
use sitepad_renderer::{ResourceStore, SiteMap, build_and_record_preview};

// === localStorage slots ===

#[wasm_bindgen_test]
fn test_local_storage_round_trip() {
    let mut slots = LocalStorageSlots::from_window().unwrap();
    slots.remove("sitepad-test").unwrap();
    assert_eq!(slots.get("sitepad-test").unwrap(), None);

    slots.set("sitepad-test", "value").unwrap();
    assert_eq!(slots.get("sitepad-test").unwrap().as_deref(), Some("value"));

    slots.remove("sitepad-test").unwrap();
    assert!(!slots.contains("sitepad-test").unwrap());
}

#[wasm_bindgen_test]
fn test_session_persists_to_local_storage() {
    let mut files = FileMap::new();
    files.insert("index.html".into(), "<p>one</p>".into());
    let slots = LocalStorageSlots::from_window().unwrap();
    let mut session = EditorSession::from_files(files, slots, "sitepad-test-session");

    session
        .workspace_mut()
        .edit_content("index.html", "<p>two</p>")
        .unwrap();
    session.save_active().unwrap();

    let stored = session.store().get("sitepad-test-session").unwrap().unwrap();
    assert!(stored.starts_with("data:application/zip;base64,"));
    session.clear_saved().unwrap();
}

#[wasm_bindgen_test]
fn test_save_without_file_reports_no_active_file() {
    let slots = LocalStorageSlots::from_window().unwrap();
    let mut session = EditorSession::from_files(FileMap::new(), slots, "sitepad-test-empty");
    assert!(matches!(
        session.save_active(),
        Err(SessionError::Workspace(_))
    ));
}

// === object URLs ===

#[wasm_bindgen_test]
fn test_blob_handles_are_object_urls() {
    let mut store = BlobResourceStore::new();
    let handle = store.create("/a.css", "text/css", b"a {}").unwrap();
    assert!(handle.as_str().starts_with("blob:"));
    store.revoke(&handle);
}

#[wasm_bindgen_test]
fn test_preview_rewrites_to_blob_urls() {
    let mut files = FileMap::new();
    files.insert("index.html".into(), "<img src='a.png'>".into());
    files.insert("a.png".into(), FileContent::from(vec![0x89, b'P', b'N', b'G']));
    let mut store = BlobResourceStore::new();
    let mut slots = LocalStorageSlots::from_window().unwrap();

    let build =
        build_and_record_preview(&files, &mut store, &mut slots, "sitepad-test-map").unwrap();
    assert!(build.is_clean());
    assert!(build.entry_point().unwrap().as_str().starts_with("blob:"));

    let recorded = SiteMap::load(&slots, "sitepad-test-map").unwrap().unwrap();
    assert_eq!(recorded.len(), 2);
    slots.remove("sitepad-test-map").unwrap();
}

// === page helpers ===

#[wasm_bindgen_test]
fn test_resolve_url_keeps_absolute_urls() {
    assert_eq!(
        resolve_url("https://example.com/site.zip"),
        "https://example.com/site.zip"
    );
    assert!(resolve_url("/rawtastic-main.zip").ends_with("/rawtastic-main.zip"));
}

#[wasm_bindgen_test]
fn test_missing_query_param() {
    assert_eq!(query_param("sitepad-never-set"), None);
}

// === file explorer ===

fn mount(id: &str, tag: &str) -> Element {
    let document = gloo_utils::document();
    let element = document.create_element(tag).unwrap();
    element.set_id(id);
    document.body().unwrap().append_child(&element).unwrap();
    element
}

fn find(selector: &str) -> Option<Element> {
    gloo_utils::document().query_selector(selector).unwrap()
}

fn has_class(selector: &str, class: &str) -> bool {
    find(selector).unwrap().class_list().contains(class)
}

fn editor(slot: &str) -> BrowserEditor {
    let mut files = FileMap::new();
    files.insert("index.html".into(), "<p>one</p>".into());
    files.insert("css/site.css".into(), "body {}".into());
    files.insert("img/logo.png".into(), FileContent::from(vec![0x89, b'P']));
    let slots = LocalStorageSlots::from_window().unwrap();
    let session = EditorSession::from_files(files, slots, slot);
    BrowserEditor::new(session, Config::default(), SitepadHttpClient::default())
}

#[wasm_bindgen_test]
fn test_explorer_renders_visible_files_and_folder_buttons() {
    let explorer = mount(EXPLORER_ID, "div");
    let editor = editor("sitepad-test-explorer");
    editor.render_explorer();

    assert!(find(r#"[data-filename="index.html"]"#).is_some());
    assert!(find(r#"[data-filename="css/site.css"]"#).is_some());
    assert!(find(r#"[data-filename="img/logo.png"]"#).is_none());
    assert!(find(r#".folder-new-file-btn[data-folder="css"]"#).is_some());
    assert!(has_class(r#"[data-filename="index.html"]"#, ACTIVE_CLASS));

    explorer.remove();
}

#[wasm_bindgen_test]
fn test_open_edit_and_save_drive_the_markers() {
    let explorer = mount(EXPLORER_ID, "div");
    let save = mount(Control::Save.id(), "button");
    let mut editor = editor("sitepad-test-markers");
    editor.render_explorer();

    let css = r#"[data-filename="css/site.css"]"#;
    editor.open_file("css/site.css").unwrap();
    assert!(has_class(css, ACTIVE_CLASS));
    assert!(!has_class(r#"[data-filename="index.html"]"#, ACTIVE_CLASS));
    assert!(!has_class(css, DIRTY_CLASS));

    assert_eq!(
        editor.on_content_changed("body { color: red }").unwrap(),
        DirtyState::Dirty
    );
    assert!(has_class(css, DIRTY_CLASS));
    assert_eq!(editor.on_content_changed("body {}").unwrap(), DirtyState::Clean);
    assert!(!has_class(css, DIRTY_CLASS));

    editor.on_content_changed("body { margin: 0 }").unwrap();
    assert_eq!(editor.save(), Feedback::SAVED);
    assert!(!has_class(css, DIRTY_CLASS));
    assert_eq!(save.text_content().as_deref(), Some("Saved!"));

    editor.session_mut().clear_saved().unwrap();
    explorer.remove();
    save.remove();
}

#[wasm_bindgen_test]
fn test_clicks_map_to_explorer_actions() {
    let explorer = mount(EXPLORER_ID, "div");
    let editor = editor("sitepad-test-actions");
    editor.render_explorer();

    let name = find(r#"[data-filename="css/site.css"] .file-name"#).unwrap();
    assert_eq!(
        action_for(&name),
        Some(ExplorerAction::Open("css/site.css".into()))
    );
    let button = find(r#".folder-new-file-btn[data-folder="css"]"#).unwrap();
    assert_eq!(
        action_for(&button),
        Some(ExplorerAction::NewFileIn("css".into()))
    );
    assert_eq!(action_for(&explorer), None);

    explorer.remove();
}

#[wasm_bindgen_test]
fn test_new_file_in_folder_is_listed_and_flashed() {
    let explorer = mount(EXPLORER_ID, "div");
    let control = mount(Control::NewFileInFolder.id(), "button");
    let mut editor = editor("sitepad-test-new-file");
    editor.render_explorer();

    assert_eq!(
        editor.new_file(Some("css"), "extra.css").unwrap(),
        "css/extra.css"
    );
    assert!(has_class(r#"[data-filename="css/extra.css"]"#, ACTIVE_CLASS));
    assert_eq!(control.text_content().as_deref(), Some("Created!"));

    assert!(editor.new_file(Some("css"), "extra.css").is_err());
    assert_eq!(control.text_content().as_deref(), Some("Failed"));

    explorer.remove();
    control.remove();
}

#[wasm_bindgen_test]
fn test_content_change_without_active_file() {
    let slots = LocalStorageSlots::from_window().unwrap();
    let session = EditorSession::from_files(FileMap::new(), slots, "sitepad-test-none");
    let mut editor = BrowserEditor::new(session, Config::default(), SitepadHttpClient::default());
    assert!(matches!(
        editor.on_content_changed("x"),
        Err(SessionError::Workspace(_))
    ));
}
