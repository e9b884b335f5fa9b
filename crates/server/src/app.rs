use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use markdown_sidecar_core::{Converter, OriginClient, SelectorSet, TokenCounter};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::{health, proxy};

/// Shared, read-only state built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub origin: OriginClient,
    pub converter: Converter,
    pub tokens: TokenCounter,
    /// Pre-validated `Content-Signal` value.
    pub content_signal: HeaderValue,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// Fails on an invalid origin URL, an invalid extra strip selector or a
    /// `Content-Signal` value that cannot be sent as a header.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let selectors = SelectorSet::with_extra(config.extra_selectors()).context("Invalid STRIP_SELECTORS")?;
        let origin = OriginClient::new(&config.fetch_config()).context("Invalid ORIGIN_BASE_URL")?;
        let content_signal =
            HeaderValue::from_str(&config.content_signal).context("CONTENT_SIGNAL is not a valid header value")?;

        Ok(Self {
            origin,
            converter: Converter::new(selectors),
            tokens: TokenCounter::new(&config.token_model),
            content_signal,
        })
    }
}

/// The sidecar router: `/healthz` plus every other path proxied and converted.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/", get(proxy::convert))
        .route("/{*path}", get(proxy::convert))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Serve until Ctrl-C or SIGTERM, letting in-flight requests finish.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_app(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down");
}
