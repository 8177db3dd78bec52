//! HTTP client seam.
//!
//! Remote calls go through [`HttpClient`] so callers can be exercised against
//! canned responses. [`SitepadHttpClient`] is the real implementation on top
//! of `reqwest`, which also works in the browser via `fetch`.

use std::future::Future;

pub type HttpError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Sends a fully-buffered request and returns a fully-buffered response.
pub trait HttpClient {
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, HttpError>>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, HttpError>> {
        (**self).send_http(request)
    }
}

pub struct SitepadHttpClient {
    pub client: reqwest::Client,
}

impl HttpClient for SitepadHttpClient {
    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, HttpError> {
        let response = self.client.execute(request.try_into()?).await?;
        let mut builder = http::Response::builder().status(response.status());
        for (k, v) in response.headers() {
            builder = builder.header(k, v);
        }
        builder
            .body(response.bytes().await?.to_vec())
            .map_err(Into::into)
    }
}

impl Default for SitepadHttpClient {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

/// Fetch a URL with a plain GET and return the body, failing on non-2xx statuses.
pub async fn fetch_bytes(client: &impl HttpClient, url: &str) -> Result<Vec<u8>, HttpError> {
    let request = http::Request::get(url).body(Vec::new())?;
    let response = client.send_http(request).await?;
    if !response.status().is_success() {
        return Err(format!("GET {url} returned {}", response.status()).into());
    }
    Ok(response.into_body())
}
