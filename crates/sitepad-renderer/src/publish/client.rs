use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sitepad_common::{Config, HttpClient};
use sitepad_editor_core::{FileContent, FileMap};

use super::error::PublishError;
use super::prompt::{AuthWindow, PublishPrompt};
use super::types::{
    CreateSiteRequest, CreateSiteResponse, SessionStatus, Site, SiteChoice, SiteExistsResponse,
    SitesResponse, UploadFile, UploadRequest,
};

/// How often and how long to poll for sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollSchedule {
    /// Whole minutes the schedule covers. Saturates for absurd schedules.
    pub fn total_minutes(&self) -> u64 {
        self.interval
            .checked_mul(self.max_polls)
            .unwrap_or(Duration::MAX)
            .as_secs()
            / 60
    }

    fn polls_per_minute(&self) -> u32 {
        let secs = self.interval.as_secs().max(1);
        u32::try_from(60 / secs).unwrap_or(u32::MAX).max(1)
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 180,
        }
    }
}

/// Random 16-byte session id, hex encoded.
pub fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Encode the workspace for upload.
///
/// Text files are sent as base64 of their UTF-8 bytes. Binary files are
/// skipped, as are folder entries.
pub fn prepare_files(files: &FileMap) -> Vec<UploadFile> {
    files
        .iter()
        .filter(|(path, _)| !path.ends_with('/'))
        .filter_map(|(path, content)| match content {
            FileContent::Text(text) => Some(UploadFile {
                path: path.clone(),
                content: STANDARD.encode(text.as_bytes()),
            }),
            FileContent::Binary(_) => {
                tracing::warn!(path = %path, "skipping binary file");
                None
            }
        })
        .collect()
}

/// Client for the publishing host.
pub struct Publisher<C> {
    client: C,
    server_url: String,
    site_domain: String,
    schedule: PollSchedule,
    token: Option<String>,
}

impl<C: HttpClient> Publisher<C> {
    pub fn new(client: C, config: &Config) -> Self {
        Self {
            client,
            server_url: config.server_url.trim_end_matches('/').to_owned(),
            site_domain: config.site_domain.clone(),
            schedule: PollSchedule {
                interval: config.poll_interval(),
                max_polls: config.max_polls,
            },
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Forget the token.
    pub fn sign_out(&mut self) {
        self.token = None;
    }

    /// Public URL a subdomain is served at.
    pub fn site_url(&self, subdomain: &str) -> String {
        format!("https://{subdomain}.{}", self.site_domain)
    }

    /// Sign in through `window` and wait for the credential.
    ///
    /// Polls the session every interval, up to the schedule's limit. A
    /// pending session (404) keeps the loop going, an expired one (410) ends
    /// it at once, and so does the user closing the window.
    pub async fn authenticate(
        &mut self,
        window: &mut impl AuthWindow,
    ) -> Result<String, PublishError> {
        let session_id = new_session_id();
        let auth_url = format!("{}/cli/auth/{session_id}", self.server_url);
        let status_url = format!("{}/api/cli/session/{session_id}", self.server_url);

        tracing::info!("opening authentication window");
        window.open(&auth_url);
        tracing::info!(
            minutes = self.schedule.total_minutes(),
            "waiting for authentication"
        );

        let per_minute = self.schedule.polls_per_minute();
        let late_after = per_minute * 10;
        for i in 0..self.schedule.max_polls {
            n0_future::time::sleep(self.schedule.interval).await;
            if window.is_closed() {
                tracing::warn!("authentication window closed");
                return Err(PublishError::AuthCancelled);
            }

            match self.poll_session(&status_url).await {
                Ok(Some(token)) => {
                    tracing::info!("authentication successful");
                    window.close();
                    self.token = Some(token.clone());
                    return Ok(token);
                }
                Ok(None) => {}
                Err(PollFailure::Expired) => {
                    window.close();
                    return Err(PublishError::SessionExpired);
                }
                Err(PollFailure::NotFound) if i > late_after => {
                    tracing::warn!(
                        minutes = i / per_minute,
                        "session not found yet, the user may still be registering"
                    );
                }
                Err(PollFailure::NotFound) => {}
                Err(PollFailure::Transient(reason)) => {
                    tracing::debug!(reason = %reason, "poll failed, retrying");
                }
            }

            if i > 0 && i % per_minute == 0 {
                let elapsed = u64::from(i / per_minute);
                tracing::info!(
                    elapsed_minutes = elapsed,
                    remaining_minutes = self.schedule.total_minutes().saturating_sub(elapsed),
                    "still waiting for authentication"
                );
            }
        }

        window.close();
        Err(PublishError::AuthTimedOut {
            minutes: self.schedule.total_minutes(),
        })
    }

    async fn poll_session(&self, url: &str) -> Result<Option<String>, PollFailure> {
        let request = http::Request::get(url)
            .body(Vec::new())
            .map_err(|e| PollFailure::Transient(e.to_string()))?;
        let response = self
            .client
            .send_http(request)
            .await
            .map_err(|e| PollFailure::Transient(e.to_string()))?;
        match response.status().as_u16() {
            200 => {
                let status: SessionStatus = serde_json::from_slice(response.body())
                    .map_err(|e| PollFailure::Transient(e.to_string()))?;
                if status.status == SessionStatus::COMPLETED {
                    Ok(status.cli_token)
                } else {
                    Ok(None)
                }
            }
            404 => Err(PollFailure::NotFound),
            410 => Err(PollFailure::Expired),
            other => Err(PollFailure::Transient(format!("status {other}"))),
        }
    }

    fn bearer(&self) -> Result<String, PublishError> {
        self.token
            .as_deref()
            .map(|token| format!("Bearer {token}"))
            .ok_or(PublishError::NotAuthenticated)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<http::Response<Vec<u8>>, PublishError> {
        let bearer = self.bearer()?;
        let mut builder = http::Request::builder()
            .method(method)
            .uri(format!("{}{path}", self.server_url))
            .header(AUTHORIZATION, bearer);
        let body = match body {
            Some(body) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                serde_json::to_vec(body)?
            }
            None => Vec::new(),
        };
        self.client
            .send_http(builder.body(body)?)
            .await
            .map_err(PublishError::Http)
    }

    /// Sites owned by the authenticated user.
    pub async fn get_sites(&self) -> Result<Vec<Site>, PublishError> {
        let response = self.send(Method::GET, "/api/sites", None::<&()>).await?;
        let status = response.status();
        if status.is_success() {
            Ok(decode::<SitesResponse>(&response)?.sites)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(PublishError::InvalidToken)
        } else {
            Err(PublishError::FetchFailed(status))
        }
    }

    /// Create a site. An empty `name` falls back to the subdomain.
    pub async fn create_site(
        &self,
        subdomain: &str,
        name: &str,
        description: &str,
    ) -> Result<Site, PublishError> {
        let request = CreateSiteRequest {
            subdomain,
            name: if name.is_empty() { subdomain } else { name },
            description,
            active: true,
        };
        let response = self.send(Method::POST, "/api/sites", Some(&request)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(PublishError::InvalidToken);
        }
        if !response.status().is_success() {
            return Err(PublishError::CreateFailed(body_text(&response)));
        }
        let site = decode::<CreateSiteResponse>(&response)?.site;
        tracing::info!(name = %site.display_name(), "site created");
        Ok(site)
    }

    /// Whether `subdomain` exists. Any failure status other than a rejected
    /// token counts as "no".
    pub async fn site_exists(&self, subdomain: &str) -> Result<bool, PublishError> {
        let path = format!("/api/sites/{subdomain}");
        let response = self.send(Method::GET, &path, None::<&()>).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(PublishError::InvalidToken);
        }
        if !response.status().is_success() {
            return Ok(false);
        }
        Ok(decode::<SiteExistsResponse>(&response)?.exists)
    }

    /// Upload the text files of `files` to `subdomain`. Returns how many were sent.
    pub async fn upload_files(
        &self,
        subdomain: &str,
        files: &FileMap,
    ) -> Result<usize, PublishError> {
        self.bearer()?;
        let prepared = prepare_files(files);
        tracing::info!(count = prepared.len(), "uploading files");

        let path = format!("/api/upload/{subdomain}");
        let request = UploadRequest { files: &prepared };
        let response = self.send(Method::POST, &path, Some(&request)).await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!("files uploaded");
            return Ok(prepared.len());
        }
        Err(match status.as_u16() {
            401 => PublishError::InvalidToken,
            404 => PublishError::SiteNotFound(subdomain.to_owned()),
            422 => PublishError::UploadRejected(body_text(&response)),
            _ => PublishError::Unexpected {
                status,
                body: body_text(&response),
            },
        })
    }

    /// The whole publish workflow. Returns the public URL of the site.
    ///
    /// Signs in first when there is no token. Without a `subdomain` the user
    /// picks one of their sites or names a new one; a site that does not
    /// exist yet is only created after the user confirms.
    ///
    /// A stored token the server rejects is dropped and the user signs in
    /// again, once.
    pub async fn publish(
        &mut self,
        files: &FileMap,
        subdomain: Option<&str>,
        window: &mut impl AuthWindow,
        prompt: &mut impl PublishPrompt,
    ) -> Result<String, PublishError> {
        let had_token = self.is_authenticated();
        let mut result = self.run_publish(files, subdomain, window, prompt).await;
        if had_token && matches!(result, Err(PublishError::InvalidToken)) {
            tracing::warn!("stored token was rejected, signing in again");
            self.sign_out();
            result = self.run_publish(files, subdomain, window, prompt).await;
        }
        if let Err(e) = &result {
            tracing::error!(error = %e, "publication failed");
        }
        result
    }

    async fn run_publish(
        &mut self,
        files: &FileMap,
        subdomain: Option<&str>,
        window: &mut impl AuthWindow,
        prompt: &mut impl PublishPrompt,
    ) -> Result<String, PublishError> {
        if !self.is_authenticated() {
            self.authenticate(window).await?;
        }

        let subdomain = match subdomain.filter(|s| !s.is_empty()) {
            Some(subdomain) => subdomain.to_owned(),
            None => {
                let sites = self.get_sites().await?;
                let chosen = if sites.is_empty() {
                    prompt.ask_subdomain()
                } else {
                    match prompt.select_site(&sites) {
                        SiteChoice::Existing(subdomain) | SiteChoice::New(subdomain) => {
                            Some(subdomain)
                        }
                        SiteChoice::Cancelled => None,
                    }
                };
                chosen
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(PublishError::SubdomainRequired)?
            }
        };

        if !self.site_exists(&subdomain).await? {
            if !prompt.confirm_create(&subdomain) {
                return Err(PublishError::CreationCancelled);
            }
            self.create_site(&subdomain, "", "").await?;
        }

        self.upload_files(&subdomain, files).await?;

        let url = self.site_url(&subdomain);
        tracing::info!(url = %url, "site published");
        prompt.offer_open(&url);
        Ok(url)
    }
}

enum PollFailure {
    NotFound,
    Expired,
    Transient(String),
}

fn decode<T: DeserializeOwned>(response: &http::Response<Vec<u8>>) -> Result<T, PublishError> {
    Ok(serde_json::from_slice(response.body())?)
}

fn body_text(response: &http::Response<Vec<u8>>) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}
