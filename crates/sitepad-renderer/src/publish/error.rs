use miette::Diagnostic;
use sitepad_common::HttpError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PublishError {
    #[error("not authenticated")]
    #[diagnostic(
        code(sitepad::publish::not_authenticated),
        help("authenticate before calling the publishing API")
    )]
    NotAuthenticated,

    #[error("authentication session expired")]
    #[diagnostic(
        code(sitepad::publish::session_expired),
        help("start the publish again to get a fresh session")
    )]
    SessionExpired,

    #[error("authentication timed out after {minutes} minutes")]
    #[diagnostic(
        code(sitepad::publish::auth_timed_out),
        help("please try again")
    )]
    AuthTimedOut { minutes: u64 },

    #[error("authentication window was closed before sign-in completed")]
    #[diagnostic(code(sitepad::publish::auth_cancelled))]
    AuthCancelled,

    #[error("invalid or expired token")]
    #[diagnostic(code(sitepad::publish::invalid_token))]
    InvalidToken,

    #[error("site '{0}' not found")]
    #[diagnostic(code(sitepad::publish::site_not_found))]
    SiteNotFound(String),

    #[error("upload failed: {0}")]
    #[diagnostic(code(sitepad::publish::upload_rejected))]
    UploadRejected(String),

    #[error("failed to create site: {0}")]
    #[diagnostic(code(sitepad::publish::create_failed))]
    CreateFailed(String),

    #[error("failed to fetch sites: {0}")]
    #[diagnostic(code(sitepad::publish::fetch_failed))]
    FetchFailed(http::StatusCode),

    #[error("unexpected error ({status}): {body}")]
    #[diagnostic(code(sitepad::publish::unexpected))]
    Unexpected { status: http::StatusCode, body: String },

    #[error("site creation cancelled")]
    #[diagnostic(code(sitepad::publish::creation_cancelled))]
    CreationCancelled,

    #[error("subdomain required")]
    #[diagnostic(code(sitepad::publish::subdomain_required))]
    SubdomainRequired,

    #[error("request failed: {0}")]
    #[diagnostic(code(sitepad::publish::http))]
    Http(#[source] HttpError),

    #[error("malformed response: {0}")]
    #[diagnostic(code(sitepad::publish::json))]
    Json(#[from] serde_json::Error),
}

impl From<http::Error> for PublishError {
    fn from(e: http::Error) -> Self {
        PublishError::Http(e.into())
    }
}
