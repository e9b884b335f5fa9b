use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use axum::Json;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "markdown-sidecar";

const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self { status: "ok".to_string(), service: SERVICE_NAME.to_string() }
    }
}

/// Liveness endpoint. Never touches the origin.
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

/// URL the `--healthcheck` self-check requests. Wildcard listen addresses are
/// checked on loopback.
pub fn healthcheck_url(listen_addr: SocketAddr) -> String {
    let mut target = listen_addr;
    if target.ip().is_unspecified() {
        match target {
            SocketAddr::V4(_) => target.set_ip(Ipv4Addr::LOCALHOST.into()),
            SocketAddr::V6(_) => target.set_ip(Ipv6Addr::LOCALHOST.into()),
        }
    }
    format!("http://{target}/healthz")
}

/// Whether a sidecar on `listen_addr` answers its health endpoint with 200.
pub async fn check_health(listen_addr: SocketAddr) -> bool {
    let client = match reqwest::Client::builder().timeout(CHECK_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(healthcheck_url(listen_addr)).send().await {
        Ok(response) => response.status() == reqwest::StatusCode::OK,
        Err(_) => false,
    }
}
