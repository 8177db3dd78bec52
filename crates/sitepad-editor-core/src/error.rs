use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("no file named {0:?} in the workspace")]
    #[diagnostic(code(sitepad::workspace::not_found))]
    NotFound(String),

    #[error("a file named {0:?} already exists")]
    #[diagnostic(
        code(sitepad::workspace::already_exists),
        help("pick a different name, or open the existing file instead")
    )]
    AlreadyExists(String),

    #[error("no file selected")]
    #[diagnostic(code(sitepad::workspace::no_active_file))]
    NoActiveFile,

    #[error("{0:?} is a binary file and cannot be edited as text")]
    #[diagnostic(code(sitepad::workspace::not_text))]
    NotText(String),

    #[error("invalid file path {path:?}: {reason}")]
    #[diagnostic(code(sitepad::workspace::invalid_path))]
    InvalidPath { path: String, reason: &'static str },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ArchiveError {
    #[error("could not read archive: {0}")]
    #[diagnostic(
        code(sitepad::archive::decode),
        help("the bundle must be a zip file")
    )]
    Decode(#[source] zip::result::ZipError),

    #[error("could not write archive: {0}")]
    #[diagnostic(code(sitepad::archive::encode))]
    Encode(#[source] zip::result::ZipError),

    #[error("archive entry {path:?} could not be read: {source}")]
    #[diagnostic(code(sitepad::archive::entry))]
    Entry {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data URL: {0}")]
    #[diagnostic(code(sitepad::archive::data_url))]
    DataUrl(String),

    #[error("io error: {0}")]
    #[diagnostic(code(sitepad::archive::io))]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic_source]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    #[diagnostic_source]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    #[diagnostic_source]
    Storage(#[from] sitepad_common::StorageError),

    #[error("failed to fetch site bundle from {location}: {source}")]
    #[diagnostic(code(sitepad::session::fetch))]
    Fetch {
        location: String,
        #[source]
        source: sitepad_common::HttpError,
    },
}
