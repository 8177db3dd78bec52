//! Wire types of the publishing API.

use serde::{Deserialize, Serialize};

/// A site owned by the authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub subdomain: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
}

impl Site {
    /// Name to show in a selector, falling back to the subdomain.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.subdomain
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cli_token: Option<String>,
}

impl SessionStatus {
    pub(crate) const COMPLETED: &'static str = "completed";
}

#[derive(Debug, Deserialize)]
pub(crate) struct SitesResponse {
    #[serde(default)]
    pub sites: Vec<Site>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSiteRequest<'a> {
    pub subdomain: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSiteResponse {
    pub site: Site,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteExistsResponse {
    #[serde(default)]
    pub exists: bool,
}

/// One file in an upload: site path plus base64 content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadRequest<'a> {
    pub files: &'a [UploadFile],
}

/// What the user picked in the site selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiteChoice {
    Existing(String),
    /// Create a new site under this subdomain.
    New(String),
    Cancelled,
}
