//! The proxy request lifecycle.
//!
//! Every request ends in exactly one [`ProxyOutcome`]: the origin could not
//! be reached, it answered with an error, it answered with something other
//! than HTML, or its HTML was converted to Markdown.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderName, VARY};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use markdown_sidecar_core::{Conversion, is_html};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::app::AppState;

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";
pub const CACHE_POLICY: &str = "public, max-age=300";

pub const UNREACHABLE_BODY: &str = "Origin unreachable";
pub const ORIGIN_ERROR_BODY: &str = "Origin returned an error";

pub static X_MARKDOWN_TOKENS: HeaderName = HeaderName::from_static("x-markdown-tokens");
pub static X_CONVERSION_TIME_MS: HeaderName = HeaderName::from_static("x-conversion-time-ms");
pub static CONTENT_SIGNAL: HeaderName = HeaderName::from_static("content-signal");

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
];

#[derive(Debug)]
pub enum ProxyOutcome {
    /// No usable response from the origin. Answered with 502.
    OriginUnreachable,
    /// The origin answered 400 or above; its status is forwarded.
    OriginError(StatusCode),
    /// Non-HTML response, relayed as is.
    Passthrough { status: StatusCode, headers: HeaderMap, body: Bytes },
    Converted(Converted),
}

/// A Markdown rendition ready to send.
#[derive(Debug)]
pub struct Converted {
    pub markdown: String,
    pub tokens: usize,
    pub elapsed_ms: u64,
    pub content_signal: HeaderValue,
}

impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::OriginUnreachable => (StatusCode::BAD_GATEWAY, UNREACHABLE_BODY).into_response(),
            Self::OriginError(status) => (status, ORIGIN_ERROR_BODY).into_response(),
            Self::Passthrough { status, mut headers, body } => {
                strip_hop_by_hop(&mut headers);
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                response
            }
            Self::Converted(converted) => converted.into_response(),
        }
    }
}

impl IntoResponse for Converted {
    fn into_response(self) -> Response {
        let headers = [
            (CONTENT_TYPE, HeaderValue::from_static(MARKDOWN_CONTENT_TYPE)),
            (X_MARKDOWN_TOKENS.clone(), HeaderValue::from(self.tokens)),
            (X_CONVERSION_TIME_MS.clone(), HeaderValue::from(self.elapsed_ms)),
            (CONTENT_SIGNAL.clone(), self.content_signal),
            (VARY, HeaderValue::from_static("Accept")),
            (CACHE_CONTROL, HeaderValue::from_static(CACHE_POLICY)),
        ];

        (StatusCode::OK, headers, self.markdown).into_response()
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(axum::http::header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove(axum::http::header::UPGRADE);
}

/// Handler for every proxied path. HEAD is served by the same route with
/// the body dropped.
pub async fn convert(
    State(state): State<Arc<AppState>>, ConnectInfo(remote): ConnectInfo<SocketAddr>, uri: Uri,
) -> ProxyOutcome {
    let url = state.origin.origin_url(uri.path(), uri.query());
    info!(url = %url, "Converting");

    handle(&state, &url, Some(remote.ip())).await
}

/// Fetch `url` from the origin and settle on an outcome.
pub async fn handle(state: &Arc<AppState>, url: &str, client_ip: Option<IpAddr>) -> ProxyOutcome {
    let start = Instant::now();

    let response = match state.origin.fetch(url, client_ip).await {
        Ok(response) => response,
        Err(err) => {
            error!(url, error = %err, "Origin request failed");
            return ProxyOutcome::OriginUnreachable;
        }
    };

    let status = response.status();
    if status.as_u16() >= 400 {
        info!(url, status = status.as_u16(), "Origin returned an error");
        return ProxyOutcome::OriginError(status);
    }

    if !is_html(response.headers()) {
        let headers = response.headers().clone();
        return match response.bytes().await {
            Ok(body) => ProxyOutcome::Passthrough { status, headers, body },
            Err(err) => {
                error!(url, error = %err, "Failed to read origin body");
                ProxyOutcome::OriginUnreachable
            }
        };
    }

    let html = match state.origin.read_text(response).await {
        Ok(html) => html,
        Err(err) => {
            error!(url, error = %err, "Failed to read origin body");
            return ProxyOutcome::OriginUnreachable;
        }
    };

    let (markdown, tokens) = convert_blocking(Arc::clone(state), html, url).await;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(url, tokens, duration_ms = elapsed_ms, "Converted");

    ProxyOutcome::Converted(Converted { markdown, tokens, elapsed_ms, content_signal: state.content_signal.clone() })
}

/// Run the parse and render on the blocking pool. A panicked task yields an
/// empty body.
async fn convert_blocking(state: Arc<AppState>, html: String, url: &str) -> (String, usize) {
    let task = tokio::task::spawn_blocking(move || {
        let conversion = state.converter.convert(&html);
        let tokens = state.tokens.count(&conversion.markdown);
        (conversion, tokens)
    });

    settle(task.await, url)
}

/// Body and token count to send for a finished conversion task.
fn settle(joined: Result<(Conversion, usize), JoinError>, url: &str) -> (String, usize) {
    match joined {
        Ok((conversion, tokens)) => {
            if let Some(reason) = &conversion.degraded {
                warn!(url, error = %reason, "Conversion degraded to an empty body");
            }
            debug!(url, landmark = %conversion.landmark, stripped = conversion.stripped, "Content root");
            (conversion.markdown, tokens)
        }
        Err(err) => {
            warn!(url, error = %err, "Conversion task failed");
            (String::new(), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use markdown_sidecar_core::{Landmark, Metadata, SidecarError};

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_response() {
        let response = ProxyOutcome::OriginUnreachable.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_string(response).await, "Origin unreachable");
    }

    #[tokio::test]
    async fn test_origin_error_keeps_status() {
        let response = ProxyOutcome::OriginError(StatusCode::NOT_FOUND).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "Origin returned an error");

        let response = ProxyOutcome::OriginError(StatusCode::SERVICE_UNAVAILABLE).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_passthrough_relays_exactly() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-custom", HeaderValue::from_static("kept"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));

        let outcome = ProxyOutcome::Passthrough {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(br#"{"key": "value"}"#),
        };
        let response = outcome.into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()["x-custom"], "kept");
        assert!(response.headers().get("transfer-encoding").is_none());
        assert_eq!(body_string(response).await, r#"{"key": "value"}"#);
    }

    #[tokio::test]
    async fn test_passthrough_without_content_type() {
        let outcome = ProxyOutcome::Passthrough {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"raw"),
        };
        let response = outcome.into_response();

        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_string(response).await, "raw");
    }

    #[tokio::test]
    async fn test_converted_headers() {
        let outcome = ProxyOutcome::Converted(Converted {
            markdown: "# Title".to_string(),
            tokens: 2,
            elapsed_ms: 7,
            content_signal: HeaderValue::from_static("ai-train=no"),
        });
        let response = outcome.into_response();
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "text/markdown; charset=utf-8");
        assert_eq!(headers["x-markdown-tokens"], "2");
        assert_eq!(headers["x-conversion-time-ms"], "7");
        assert_eq!(headers["content-signal"], "ai-train=no");
        assert_eq!(headers[VARY], "Accept");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=300");
        assert_eq!(body_string(response).await, "# Title");
    }

    #[tokio::test]
    async fn test_converted_empty_body_still_ok() {
        let outcome = ProxyOutcome::Converted(Converted {
            markdown: String::new(),
            tokens: 0,
            elapsed_ms: 0,
            content_signal: HeaderValue::from_static("search=yes"),
        });
        let response = outcome.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-markdown-tokens"], "0");
        assert_eq!(body_string(response).await, "");
    }

    fn degraded_conversion() -> Conversion {
        Conversion {
            markdown: "---\ntitle: \"Kept\"\n---\n\n".to_string(),
            metadata: Metadata { title: "Kept".to_string(), ..Default::default() },
            landmark: Landmark::Main,
            stripped: 0,
            degraded: Some(SidecarError::RenderError("boom".to_string())),
        }
    }

    #[tokio::test]
    async fn test_degraded_conversion_still_served() {
        let (markdown, tokens) = settle(Ok((degraded_conversion(), 5)), "http://origin/page");
        assert_eq!(markdown, "---\ntitle: \"Kept\"\n---\n\n");
        assert_eq!(tokens, 5);

        let outcome = ProxyOutcome::Converted(Converted {
            markdown,
            tokens,
            elapsed_ms: 1,
            content_signal: HeaderValue::from_static("search=yes"),
        });
        let response = outcome.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], MARKDOWN_CONTENT_TYPE);
        assert_eq!(body_string(response).await, "---\ntitle: \"Kept\"\n---\n\n");
    }

    #[tokio::test]
    async fn test_panicked_conversion_yields_empty_body() {
        let joined = tokio::task::spawn_blocking(|| -> (Conversion, usize) { panic!("renderer crashed") }).await;
        assert!(joined.is_err());

        assert_eq!(settle(joined, "http://origin/page"), (String::new(), 0));
    }

    #[test]
    fn test_strip_hop_by_hop_honours_connection() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, x-session"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session", HeaderValue::from_static("abc"));
        headers.insert("upgrade", HeaderValue::from_static("h2c"));
        headers.insert("etag", HeaderValue::from_static("\"v1\""));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["etag"], "\"v1\"");
    }
}
