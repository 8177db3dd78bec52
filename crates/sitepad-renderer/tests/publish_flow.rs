// Publish client against a scripted host: sign-in polling, site selection,
// creation and upload.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sitepad_common::{Config, HttpClient, HttpError};
use sitepad_editor_core::{FileContent, FileMap};
use sitepad_renderer::publish::{
    AuthWindow, PollSchedule, PublishError, PublishPrompt, Publisher, Site, SiteChoice,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: http::Method,
    path: String,
    authorization: Option<String>,
    body: Vec<u8>,
}

/// A fake publishing host. Session polls are answered from a script and
/// fall back to 404 once it runs out. API calls carrying the `revoked` token
/// get a 401.
#[derive(Default)]
struct Host {
    polls: Mutex<VecDeque<(u16, &'static str)>>,
    revoked: Option<&'static str>,
    sites: Vec<Site>,
    existing: Vec<&'static str>,
    upload_status: u16,
    sites_status: u16,
    requests: Mutex<Vec<Recorded>>,
}

impl Host {
    fn with_polls(polls: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
        Self {
            polls: Mutex::new(polls.into_iter().collect()),
            upload_status: 200,
            sites_status: 200,
            ..Self::default()
        }
    }

    fn idle() -> Self {
        Self::with_polls(Vec::new())
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    fn respond(&self, method: &http::Method, path: &str, body: &[u8]) -> (u16, String) {
        if path.starts_with("/api/cli/session/") {
            let (status, body) = self.polls.lock().unwrap().pop_front().unwrap_or((404, ""));
            return (status, body.to_owned());
        }
        if path == "/api/sites" && method == http::Method::GET {
            let sites = serde_json::json!({ "sites": self.sites });
            return (self.sites_status, sites.to_string());
        }
        if path == "/api/sites" && method == http::Method::POST {
            let request: serde_json::Value = serde_json::from_slice(body).unwrap();
            return (200, serde_json::json!({ "site": request }).to_string());
        }
        if let Some(subdomain) = path.strip_prefix("/api/sites/") {
            let exists = self.existing.iter().any(|s| *s == subdomain);
            return (200, serde_json::json!({ "exists": exists }).to_string());
        }
        if path.starts_with("/api/upload/") {
            let body = if self.upload_status == 200 { "{}" } else { "bad files" };
            return (self.upload_status, body.to_owned());
        }
        (500, String::new())
    }
}

impl HttpClient for Host {
    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, HttpError> {
        let path = request.uri().path().to_owned();
        let authorization = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bearer = authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "));
        let revoked = self.revoked.is_some_and(|token| bearer == Some(token));
        let (status, body) = if revoked {
            (401, String::new())
        } else {
            self.respond(request.method(), &path, request.body())
        };
        self.requests.lock().unwrap().push(Recorded {
            method: request.method().clone(),
            path,
            authorization,
            body: request.into_body(),
        });
        Ok(http::Response::builder()
            .status(status)
            .body(body.into_bytes())?)
    }
}

#[derive(Default)]
struct Window {
    opened: Option<String>,
    closed_by_user: bool,
    closed: bool,
}

impl AuthWindow for Window {
    fn open(&mut self, url: &str) {
        self.opened = Some(url.to_owned());
    }

    fn is_closed(&self) -> bool {
        self.closed_by_user
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[derive(Default)]
struct Answers {
    subdomain: Option<String>,
    choice: Option<SiteChoice>,
    create: bool,
    asked_create: Vec<String>,
}

impl PublishPrompt for Answers {
    fn ask_subdomain(&mut self) -> Option<String> {
        self.subdomain.clone()
    }

    fn select_site(&mut self, _sites: &[Site]) -> SiteChoice {
        self.choice.clone().unwrap_or(SiteChoice::Cancelled)
    }

    fn confirm_create(&mut self, subdomain: &str) -> bool {
        self.asked_create.push(subdomain.to_owned());
        self.create
    }
}

const COMPLETED: &str = r#"{"status":"completed","cli_token":"tok-123"}"#;

fn files() -> FileMap {
    let mut files = FileMap::new();
    files.insert("index.html".into(), "<h1>héllo</h1>".into());
    files.insert("img/".into(), "".into());
    files.insert("img/a.png".into(), FileContent::from(vec![1u8, 2, 3]));
    files
}

#[test]
fn poll_schedule_covers_fifteen_minutes_and_saturates() {
    assert_eq!(PollSchedule::default().total_minutes(), 15);
    let absurd = PollSchedule {
        interval: Duration::from_secs(u64::MAX),
        max_polls: u32::MAX,
    };
    assert_eq!(absurd.total_minutes(), u64::MAX / 60);
}

#[test]
fn site_url_uses_the_configured_domain() {
    let config = Config {
        site_domain: "example.test".into(),
        ..Config::default()
    };
    let publisher = Publisher::new(Host::idle(), &config);
    assert_eq!(publisher.site_url("blog"), "https://blog.example.test");
}

#[tokio::test(start_paused = true)]
async fn sign_in_completes_on_the_third_poll() {
    let host = Host::with_polls([(404, ""), (404, ""), (200, COMPLETED)]);
    let mut publisher = Publisher::new(&host, &Config::default());
    let mut window = Window::default();

    let started = tokio::time::Instant::now();
    let token = publisher.authenticate(&mut window).await.unwrap();

    assert_eq!(token, "tok-123");
    assert_eq!(publisher.token(), Some("tok-123"));
    assert_eq!(host.count("/api/cli/session/"), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(15));
    assert!(window.closed);

    let opened = window.opened.unwrap();
    let session = opened.strip_prefix("https://drifting.ink/cli/auth/").unwrap();
    assert_eq!(session.len(), 32);
    assert!(host.requests()[0].path.ends_with(session));
}

#[tokio::test(start_paused = true)]
async fn sign_in_gives_up_after_the_poll_ceiling() {
    let host = Host::idle();
    let mut publisher = Publisher::new(&host, &Config::default());
    let mut window = Window::default();

    let started = tokio::time::Instant::now();
    let err = publisher.authenticate(&mut window).await.unwrap_err();

    assert!(matches!(err, PublishError::AuthTimedOut { minutes: 15 }));
    assert_eq!(host.count("/api/cli/session/"), 180);
    assert_eq!(started.elapsed(), Duration::from_secs(900));
    assert!(!publisher.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn pending_and_failing_polls_keep_waiting() {
    let host = Host::with_polls([
        (500, ""),
        (200, r#"{"status":"pending"}"#),
        (200, "not json"),
        (200, COMPLETED),
    ]);
    let mut publisher = Publisher::new(&host, &Config::default());
    let token = publisher.authenticate(&mut Window::default()).await.unwrap();
    assert_eq!(token, "tok-123");
    assert_eq!(host.count("/api/cli/session/"), 4);
}

#[tokio::test(start_paused = true)]
async fn expired_session_stops_immediately() {
    let host = Host::with_polls([(404, ""), (410, ""), (200, COMPLETED)]);
    let mut publisher = Publisher::new(&host, &Config::default());
    let err = publisher
        .authenticate(&mut Window::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::SessionExpired));
    assert_eq!(host.count("/api/cli/session/"), 2);
}

#[tokio::test(start_paused = true)]
async fn closing_the_window_cancels_sign_in() {
    let host = Host::with_polls([(200, COMPLETED)]);
    let mut publisher = Publisher::new(&host, &Config::default());
    let mut window = Window {
        closed_by_user: true,
        ..Window::default()
    };
    let err = publisher.authenticate(&mut window).await.unwrap_err();
    assert!(matches!(err, PublishError::AuthCancelled));
    assert_eq!(host.count("/api/cli/session/"), 0);
}

#[tokio::test]
async fn api_calls_need_a_token_before_touching_the_network() {
    let host = Host::idle();
    let publisher = Publisher::new(&host, &Config::default());

    assert!(matches!(
        publisher.get_sites().await,
        Err(PublishError::NotAuthenticated)
    ));
    assert!(matches!(
        publisher.site_exists("blog").await,
        Err(PublishError::NotAuthenticated)
    ));
    assert!(matches!(
        publisher.upload_files("blog", &files()).await,
        Err(PublishError::NotAuthenticated)
    ));
    assert!(host.requests().is_empty());
}

#[tokio::test]
async fn first_site_is_created_after_confirmation_and_text_is_uploaded() {
    let host = Host::idle();
    let mut publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    let mut answers = Answers {
        subdomain: Some("mysite".into()),
        create: true,
        ..Answers::default()
    };

    let url = publisher
        .publish(&files(), None, &mut Window::default(), &mut answers)
        .await
        .unwrap();
    assert_eq!(url, "https://mysite.drifting.ink");
    assert_eq!(answers.asked_create, vec!["mysite"]);

    let requests = host.requests();
    let paths: Vec<_> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(
        paths,
        vec![
            "GET /api/sites",
            "GET /api/sites/mysite",
            "POST /api/sites",
            "POST /api/upload/mysite",
        ]
    );
    assert!(
        requests
            .iter()
            .all(|r| r.authorization.as_deref() == Some("Bearer tok"))
    );

    let created: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
    assert_eq!(
        created,
        serde_json::json!({
            "subdomain": "mysite",
            "name": "mysite",
            "description": "",
            "active": true,
        })
    );

    let upload: serde_json::Value = serde_json::from_slice(&requests[3].body).unwrap();
    let uploaded = upload["files"].as_array().unwrap();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0]["path"], "index.html");
    let content = STANDARD
        .decode(uploaded[0]["content"].as_str().unwrap())
        .unwrap();
    assert_eq!(String::from_utf8(content).unwrap(), "<h1>héllo</h1>");
}

#[tokio::test]
async fn existing_site_from_the_selector_is_not_recreated() {
    let host = Host {
        sites: vec![Site {
            subdomain: "blog".into(),
            name: "My Blog".into(),
            description: String::new(),
            active: true,
        }],
        existing: vec!["blog"],
        ..Host::idle()
    };
    let mut publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    let mut answers = Answers {
        choice: Some(SiteChoice::Existing("blog".into())),
        ..Answers::default()
    };

    let url = publisher
        .publish(&files(), None, &mut Window::default(), &mut answers)
        .await
        .unwrap();
    assert_eq!(url, "https://blog.drifting.ink");
    assert!(answers.asked_create.is_empty());
    assert_eq!(host.count("/api/upload/blog"), 1);
}

#[tokio::test]
async fn declining_creation_uploads_nothing() {
    let host = Host::idle();
    let mut publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    let mut answers = Answers::default();

    let err = publisher
        .publish(&files(), Some("fresh"), &mut Window::default(), &mut answers)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::CreationCancelled));
    assert_eq!(host.count("/api/upload/"), 0);
}

#[tokio::test]
async fn cancelled_selection_requires_a_subdomain() {
    let host = Host {
        sites: vec![Site {
            subdomain: "blog".into(),
            name: String::new(),
            description: String::new(),
            active: true,
        }],
        ..Host::idle()
    };
    let mut publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    let err = publisher
        .publish(&files(), None, &mut Window::default(), &mut Answers::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::SubdomainRequired));
}

#[tokio::test]
async fn upload_and_listing_failures_map_to_errors() {
    let host = Host {
        upload_status: 422,
        sites_status: 401,
        ..Host::idle()
    };
    let publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    match publisher.upload_files("blog", &files()).await {
        Err(PublishError::UploadRejected(body)) => assert_eq!(body, "bad files"),
        other => panic!("expected upload rejection, got {other:?}"),
    }
    assert!(matches!(
        publisher.get_sites().await,
        Err(PublishError::InvalidToken)
    ));

    let host = Host {
        upload_status: 404,
        sites_status: 503,
        ..Host::idle()
    };
    let publisher = Publisher::new(&host, &Config::default()).with_token("tok");
    assert!(matches!(
        publisher.upload_files("gone", &files()).await,
        Err(PublishError::SiteNotFound(s)) if s == "gone"
    ));
    assert!(matches!(
        publisher.get_sites().await,
        Err(PublishError::FetchFailed(status)) if status.as_u16() == 503
    ));
}

#[tokio::test(start_paused = true)]
async fn rejected_token_is_replaced_by_signing_in_again() {
    let host = Host {
        revoked: Some("stale"),
        existing: vec!["blog"],
        ..Host::with_polls([(200, COMPLETED)])
    };
    let mut publisher = Publisher::new(&host, &Config::default()).with_token("stale");
    let mut window = Window::default();

    let url = publisher
        .publish(&files(), Some("blog"), &mut window, &mut Answers::default())
        .await
        .unwrap();

    assert_eq!(url, "https://blog.drifting.ink");
    assert_eq!(publisher.token(), Some("tok-123"));
    assert!(window.opened.is_some());
    assert_eq!(host.count("/api/cli/session/"), 1);

    let uploads: Vec<_> = host
        .requests()
        .into_iter()
        .filter(|r| r.path == "/api/upload/blog")
        .collect();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].authorization.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test(start_paused = true)]
async fn fresh_token_rejected_is_not_retried() {
    let host = Host {
        revoked: Some("tok-123"),
        ..Host::with_polls([(200, COMPLETED), (200, COMPLETED)])
    };
    let mut publisher = Publisher::new(&host, &Config::default());

    let err = publisher
        .publish(
            &files(),
            Some("blog"),
            &mut Window::default(),
            &mut Answers::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::InvalidToken));
    assert_eq!(host.count("/api/cli/session/"), 1);
}
