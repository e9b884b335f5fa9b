//! Origin fetching.
//!
//! The origin is always asked for HTML, whatever the caller sent: content
//! negotiation already happened in front of this service.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response, redirect};
use url::Url;

use crate::{Result, SidecarError};

/// User-Agent sent to the origin.
pub const USER_AGENT: &str = "markdown-sidecar/0.1";

/// Redirect hops followed before the request fails.
pub const MAX_REDIRECTS: usize = 10;

/// Origin client configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Scheme, host and optional path prefix of the origin.
    pub base_url: String,
    /// Timeout for the whole exchange, in seconds.
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8080".to_string(), timeout: 10, user_agent: USER_AGENT.to_string() }
    }
}

/// Reusable HTTP client bound to one origin.
#[derive(Debug, Clone)]
pub struct OriginClient {
    client: Client,
    base_url: String,
    timeout: u64,
}

impl OriginClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`SidecarError::InvalidUrl`] if the base URL does not parse
    /// or has no host, and [`SidecarError::HttpError`] if the TLS backend
    /// cannot be initialised.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| SidecarError::InvalidUrl(e.to_string()))?;
        if !parsed.has_host() {
            return Err(SidecarError::InvalidUrl(format!("{} has no host", config.base_url)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string(), timeout: config.timeout })
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}{path}?{query}`; an empty path becomes `/`.
    ///
    /// ```rust
    /// use markdown_sidecar_core::{FetchConfig, OriginClient};
    ///
    /// let config = FetchConfig { base_url: "http://origin:8080/".into(), ..Default::default() };
    /// let origin = OriginClient::new(&config).unwrap();
    ///
    /// assert_eq!(origin.origin_url("/news", Some("page=2")), "http://origin:8080/news?page=2");
    /// assert_eq!(origin.origin_url("", None), "http://origin:8080/");
    /// ```
    pub fn origin_url(&self, path: &str, query: Option<&str>) -> String {
        let path = if path.is_empty() { "/" } else { path };
        match query {
            Some(query) if !query.is_empty() => format!("{}{}?{}", self.base_url, path, query),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    /// GET `url` from the origin as HTML.
    ///
    /// Sends `Accept: text/html` and, when known, the caller's address as
    /// `X-Forwarded-For`. Any status code counts as success here; callers
    /// branch on it.
    ///
    /// # Errors
    ///
    /// [`SidecarError::Timeout`], [`SidecarError::TooManyRedirects`] or
    /// [`SidecarError::HttpError`] when no response arrives.
    pub async fn fetch(&self, url: &str, forwarded_for: Option<IpAddr>) -> Result<Response> {
        let mut request = self.client.get(url).header(ACCEPT, "text/html");
        if let Some(ip) = forwarded_for {
            request = request.header("X-Forwarded-For", ip.to_string());
        }

        request.send().await.map_err(|e| self.classify(e))
    }

    /// Reads the body of an HTML response as text.
    ///
    /// # Errors
    ///
    /// Same classification as [`OriginClient::fetch`]; the timeout covers
    /// the body as well.
    pub async fn read_text(&self, response: Response) -> Result<String> {
        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> SidecarError {
        if err.is_timeout() {
            SidecarError::Timeout { timeout: self.timeout }
        } else if err.is_redirect() {
            SidecarError::TooManyRedirects { limit: MAX_REDIRECTS }
        } else {
            SidecarError::HttpError(err)
        }
    }
}

/// Whether the `Content-Type` header names HTML.
///
/// A missing or unreadable header counts as not HTML.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("text/html"))
}
