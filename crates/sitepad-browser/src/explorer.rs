//! The file explorer: the workspace tree rendered into the page, with the
//! active and dirty markers kept in step with the workspace.
//!
//! Clicks are left to the host. It listens on the explorer once and maps
//! the clicked element to an [`ExplorerAction`] with [`action_for`].

use sitepad_editor_core::{
    Control, FOLDER_ICON, FOLDER_OPEN_ICON, FolderNode, Workspace, icon_for,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element};

/// Element the tree is rendered into.
pub const EXPLORER_ID: &str = "fileExplorer";
/// Element showing the active file's path.
pub const EDITOR_HEADER_ID: &str = "editorHeader";

pub const ACTIVE_CLASS: &str = "active";
pub const DIRTY_CLASS: &str = "dirty";

const FOLDER_BUTTON_CLASS: &str = "folder-new-file-btn";

/// What a click inside the explorer asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerAction {
    /// Open the file at this path.
    Open(String),
    /// Create a file inside this folder.
    NewFileIn(String),
}

/// Map a clicked element, or any of its descendants, to an action.
pub fn action_for(target: &Element) -> Option<ExplorerAction> {
    let hit = target
        .closest(&format!("[data-filename], .{FOLDER_BUTTON_CLASS}"))
        .ok()
        .flatten()?;
    if let Some(path) = hit.get_attribute("data-filename") {
        return Some(ExplorerAction::Open(path));
    }
    hit.get_attribute("data-folder").map(ExplorerAction::NewFileIn)
}

/// Rebuild the explorer from the workspace's visible files.
///
/// Does nothing when the page has no explorer element.
pub fn render_explorer(workspace: &Workspace) -> Result<(), JsValue> {
    let document = gloo_utils::document();
    let Some(explorer) = document.get_element_by_id(EXPLORER_ID) else {
        tracing::debug!("page has no file explorer");
        return Ok(());
    };
    explorer.set_inner_html("");

    let list = element(&document, "ul", "file-list")?;
    let tree = FolderNode::build(workspace.paths());
    render_folder(&document, &tree, "", &list, false)?;
    explorer.append_child(&list)?;

    sync_indicators(workspace);
    Ok(())
}

fn render_folder(
    document: &Document,
    node: &FolderNode,
    prefix: &str,
    list: &Element,
    in_folder: bool,
) -> Result<(), JsValue> {
    for path in &node.files {
        list.append_child(&*file_item(document, path, in_folder)?)?;
    }
    for (name, child) in &node.folders {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        list.append_child(&*folder_item(document, name, &path, child)?)?;
    }
    Ok(())
}

fn file_item(document: &Document, path: &str, in_folder: bool) -> Result<Element, JsValue> {
    let item = element(document, "li", "file-item")?;
    let link = element(
        document,
        "a",
        if in_folder {
            "file-link in-folder"
        } else {
            "file-link"
        },
    )?;
    link.set_attribute("href", "#")?;
    link.set_attribute("data-filename", path)?;

    let name = if in_folder {
        path.rsplit('/').next().unwrap_or(path)
    } else {
        path
    };
    link.append_child(&*text_element(document, "span", "file-icon", icon_for(path))?)?;
    link.append_child(&*text_element(document, "span", "file-name", name)?)?;
    link.append_child(&*element(document, "span", "file-dirty-indicator")?)?;

    item.append_child(&link)?;
    Ok(item)
}

fn folder_item(
    document: &Document,
    name: &str,
    path: &str,
    node: &FolderNode,
) -> Result<Element, JsValue> {
    let item = element(document, "li", "folder-item")?;
    item.set_attribute("data-folder", path)?;

    let header = element(document, "div", "folder-header")?;
    let toggle = text_element(document, "span", "folder-toggle", "▶")?;
    let icon = text_element(document, "span", "folder-icon", FOLDER_ICON)?;
    header.append_child(&toggle)?;
    header.append_child(&icon)?;
    header.append_child(&*text_element(document, "span", "folder-name", name)?)?;

    let contents = element(document, "div", "folder-contents")?;
    contents.set_attribute("hidden", "")?;
    let list = element(document, "ul", "file-list")?;

    let button = text_element(
        document,
        "button",
        FOLDER_BUTTON_CLASS,
        Control::NewFileInFolder.label(),
    )?;
    button.set_attribute("data-folder", path)?;
    list.append_child(&button)?;
    render_folder(document, node, path, &list, true)?;
    contents.append_child(&list)?;

    let on_toggle = Closure::<dyn FnMut()>::new({
        let contents = contents.clone();
        move || {
            let expanded = contents.toggle_attribute("hidden").is_ok_and(|hidden| !hidden);
            toggle.set_text_content(Some(if expanded { "▼" } else { "▶" }));
            icon.set_text_content(Some(if expanded {
                FOLDER_OPEN_ICON
            } else {
                FOLDER_ICON
            }));
            let _ = toggle.class_list().toggle_with_force("expanded", expanded);
        }
    });
    header.add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref())?;
    // lives as long as the element
    on_toggle.forget();

    item.append_child(&header)?;
    item.append_child(&contents)?;
    Ok(item)
}

/// Set the active and dirty markers of every rendered file.
pub fn sync_indicators(workspace: &Workspace) {
    let Ok(node_list) = gloo_utils::document().query_selector_all("[data-filename]") else {
        return;
    };
    for i in 0..node_list.length() {
        let Some(node) = node_list.item(i) else {
            continue;
        };
        let Some(element) = node.dyn_ref::<Element>() else {
            continue;
        };
        let Some(path) = element.get_attribute("data-filename") else {
            continue;
        };
        let class_list = element.class_list();
        let active = workspace.active_path() == Some(path.as_str());
        let _ = class_list.toggle_with_force(ACTIVE_CLASS, active);
        let _ = class_list.toggle_with_force(DIRTY_CLASS, workspace.is_dirty(&path));
    }
    set_header(workspace.active_path());
}

/// Move the active marker to `path`.
pub fn set_active(path: &str) {
    if let Ok(node_list) = gloo_utils::document().query_selector_all(".file-link.active") {
        for i in 0..node_list.length() {
            if let Some(element) = node_list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                let _ = element.class_list().remove_1(ACTIVE_CLASS);
            }
        }
    }
    set_file_class(path, ACTIVE_CLASS, true);
    set_header(Some(path));
}

/// Show or clear the dirty marker of `path`.
pub fn set_dirty(path: &str, dirty: bool) {
    set_file_class(path, DIRTY_CLASS, dirty);
}

fn set_file_class(path: &str, class: &str, on: bool) {
    let selector = format!("[data-filename=\"{}\"]", escape_attr(path));
    if let Ok(Some(element)) = gloo_utils::document().query_selector(&selector) {
        let _ = element.class_list().toggle_with_force(class, on);
    }
}

fn set_header(path: Option<&str>) {
    if let Some(header) = gloo_utils::document().get_element_by_id(EDITOR_HEADER_ID) {
        header.set_text_content(Some(path.unwrap_or("No file selected")));
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element)
}

fn text_element(
    document: &Document,
    tag: &str,
    class: &str,
    text: &str,
) -> Result<Element, JsValue> {
    let element = element(document, tag, class)?;
    element.set_text_content(Some(text));
    Ok(element)
}
