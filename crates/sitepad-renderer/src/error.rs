use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PreviewError {
    #[error("unknown file type {extension:?} for {path}")]
    #[diagnostic(
        code(sitepad::preview::unknown_file_type),
        help("previewable files are html, css, js, md, png, jpg, jpeg and gif")
    )]
    UnknownFileType { path: String, extension: String },

    #[error("could not materialize {address}: {reason}")]
    #[diagnostic(code(sitepad::preview::resource))]
    Resource { address: String, reason: String },

    #[error("site has no /index.html to open")]
    #[diagnostic(code(sitepad::preview::no_entry_point))]
    NoEntryPoint,

    #[error("site map could not be serialized: {0}")]
    #[diagnostic(code(sitepad::preview::site_map))]
    SiteMap(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic_source]
    Storage(#[from] sitepad_common::StorageError),

    #[error(transparent)]
    #[diagnostic_source]
    Archive(#[from] sitepad_editor_core::ArchiveError),
}
