//! Folder tree projection of the workspace paths.
//!
//! The tree is recomputed from the path set whenever it is needed and never
//! persisted. Only files whose kind is shown in the tree (html, css, js, md)
//! are included; everything else stays in the mapping but out of sight.

use std::fmt::Write;

use indexmap::IndexMap;

use crate::kind::{FOLDER_ICON, FOLDER_OPEN_ICON, FileKind, icon_for};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderNode {
    /// Full paths of the files directly in this folder, in first-seen order.
    pub files: Vec<String>,
    /// Child folders by name, in first-seen order.
    pub folders: IndexMap<String, FolderNode>,
}

impl FolderNode {
    pub fn build<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut root = FolderNode::default();
        for path in paths {
            if !FileKind::from_path(path).is_some_and(FileKind::shown_in_tree) {
                continue;
            }
            let mut segments: Vec<&str> = path.split('/').collect();
            // split always yields at least one segment
            segments.pop();
            let mut current = &mut root;
            for folder in segments {
                current = current.folders.entry(folder.to_owned()).or_default();
            }
            current.files.push(path.to_owned());
        }
        root
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// Total number of files below this folder.
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .folders
                .values()
                .map(FolderNode::file_count)
                .sum::<usize>()
    }

    /// Flatten the tree in display order: files first, then folders, recursively.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows("", 0, &mut rows);
        rows
    }

    fn push_rows(&self, prefix: &str, depth: usize, rows: &mut Vec<TreeRow>) {
        for path in &self.files {
            let name = path.rsplit('/').next().unwrap_or(path);
            rows.push(TreeRow {
                depth,
                name: name.to_owned(),
                path: path.clone(),
                is_folder: false,
            });
        }
        for (name, child) in &self.folders {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            rows.push(TreeRow {
                depth,
                name: name.clone(),
                path: path.clone(),
                is_folder: true,
            });
            child.push_rows(&path, depth + 1, rows);
        }
    }
}

/// One line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    /// Display name: the last path segment.
    pub name: String,
    /// Full path of the file, or the folder's path without a trailing slash.
    pub path: String,
    pub is_folder: bool,
}

impl TreeRow {
    pub fn icon(&self) -> &'static str {
        if self.is_folder {
            FOLDER_ICON
        } else {
            icon_for(&self.path)
        }
    }
}

/// Render the workspace tree as indented text, marking the active file with
/// `>` and dirty files with `*`.
pub fn render_tree(workspace: &Workspace) -> String {
    let tree = FolderNode::build(workspace.paths());
    let mut out = String::new();
    for row in tree.rows() {
        let marker = if !row.is_folder && workspace.active_path() == Some(row.path.as_str()) {
            '>'
        } else {
            ' '
        };
        let icon = if row.is_folder { FOLDER_OPEN_ICON } else { row.icon() };
        let _ = write!(out, "{marker} {}{icon} {}", "  ".repeat(row.depth), row.name);
        if !row.is_folder && workspace.is_dirty(&row.path) {
            out.push_str(" *");
        }
        out.push('\n');
    }
    out
}
