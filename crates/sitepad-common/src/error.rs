//! Error types shared across sitepad crates

use miette::Diagnostic;

/// Main error type for sitepad plumbing operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum SitepadError {
    /// Slot storage error
    #[error(transparent)]
    #[diagnostic_source]
    Storage(#[from] StorageError),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    /// Configuration could not be read or written
    #[error("configuration error: {0}")]
    #[diagnostic(code(sitepad::config))]
    Config(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`SlotStore`](crate::storage::SlotStore).
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    #[diagnostic(code(sitepad::storage::io))]
    Io(#[from] std::io::Error),

    #[error("invalid slot key {0:?}")]
    #[diagnostic(
        code(sitepad::storage::invalid_key),
        help("slot keys may only contain ASCII letters, digits, '-' and '_'")
    )]
    InvalidKey(String),

    #[error("storage backend unavailable: {0}")]
    #[diagnostic(code(sitepad::storage::unavailable))]
    Unavailable(String),
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(sitepad::serde::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(sitepad::serde::toml_read))]
    TomlRead(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(sitepad::serde::toml_write))]
    TomlWrite(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for SitepadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(SerDeError::Json(err))
    }
}
