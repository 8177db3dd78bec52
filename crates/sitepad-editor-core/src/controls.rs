//! User-facing controls and their transient feedback.
//!
//! Controls are fire-and-forget: the host wires each one to a button (or a
//! CLI command) by its stable id, runs the action, and shows the resulting
//! [`Feedback`] in place of the control's label for a short while.

use std::time::Duration;

use crate::error::{SessionError, WorkspaceError};

/// Every action the editor exposes to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Save the active file and persist the workspace.
    Save,
    /// Materialize the site and open the preview.
    Preview,
    /// Build the archive and hand it to the user.
    Download,
    /// Run the remote publish workflow.
    Publish,
    /// Create a file at the site root.
    NewFile,
    /// Create a file inside a folder of the tree.
    NewFileInFolder,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Save,
        Control::Preview,
        Control::Download,
        Control::Publish,
        Control::NewFile,
        Control::NewFileInFolder,
    ];

    /// Stable identifier the host binds the control by.
    pub fn id(self) -> &'static str {
        match self {
            Control::Save => "save",
            Control::Preview => "preview",
            Control::Download => "download",
            Control::Publish => "publish",
            Control::NewFile => "new-file",
            Control::NewFileInFolder => "new-file-in-folder",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|control| control.id() == id)
    }

    /// Resting label.
    pub fn label(self) -> &'static str {
        match self {
            Control::Save => "Save",
            Control::Preview => "Preview",
            Control::Download => "Download",
            Control::Publish => "Publish",
            Control::NewFile => "New File",
            Control::NewFileInFolder => "+",
        }
    }
}

/// A label shown in place of a control's resting label, then reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub text: &'static str,
    pub duration: Duration,
    /// Whether the feedback reports a failure.
    pub is_error: bool,
}

impl Feedback {
    pub const SAVED: Feedback = Feedback {
        text: "Saved!",
        duration: Duration::from_millis(1500),
        is_error: false,
    };

    pub const NO_FILE_SELECTED: Feedback = Feedback {
        text: "No file selected",
        duration: Duration::from_millis(2000),
        is_error: true,
    };

    pub const PUBLISHED: Feedback = Feedback {
        text: "Published!",
        duration: Duration::from_millis(2000),
        is_error: false,
    };

    pub const OPENED: Feedback = Feedback {
        text: "Opened!",
        duration: Duration::from_millis(1500),
        is_error: false,
    };

    pub const DOWNLOADED: Feedback = Feedback {
        text: "Downloaded!",
        duration: Duration::from_millis(1500),
        is_error: false,
    };

    pub const CREATED: Feedback = Feedback {
        text: "Created!",
        duration: Duration::from_millis(1500),
        is_error: false,
    };

    pub const FAILED: Feedback = Feedback {
        text: "Failed",
        duration: Duration::from_millis(2000),
        is_error: true,
    };

    /// `success` when the action worked, [`Feedback::FAILED`] otherwise.
    pub fn outcome<T, E>(result: &Result<T, E>, success: Feedback) -> Feedback {
        if result.is_ok() {
            success
        } else {
            Feedback::FAILED
        }
    }

    /// Feedback for the outcome of a save.
    pub fn for_save<T>(result: &Result<T, SessionError>) -> Feedback {
        match result {
            Ok(_) => Feedback::SAVED,
            Err(SessionError::Workspace(WorkspaceError::NoActiveFile)) => {
                Feedback::NO_FILE_SELECTED
            }
            Err(_) => Feedback::FAILED,
        }
    }
}
