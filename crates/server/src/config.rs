//! Process configuration.
//!
//! Every option is a long flag backed by an environment variable, read once
//! at startup.

use std::net::SocketAddr;

use clap::Parser;
use markdown_sidecar_core::{DEFAULT_TOKEN_MODEL, FetchConfig, USER_AGENT};

pub const DEFAULT_ORIGIN_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONTENT_SIGNAL: &str = "ai-train=yes, search=yes, ai-input=yes";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Serve Markdown renditions of an HTML origin
#[derive(Parser, Debug, Clone)]
#[command(name = "markdown-sidecar")]
#[command(version)]
#[command(about = "Serve Markdown renditions of an HTML origin", long_about = None)]
pub struct Config {
    /// Origin the pages are fetched from
    #[arg(long, env = "ORIGIN_BASE_URL", default_value = DEFAULT_ORIGIN_BASE_URL, value_name = "URL")]
    pub origin_base_url: String,

    /// Origin timeout in seconds
    #[arg(long, env = "ORIGIN_TIMEOUT", default_value_t = 10, value_name = "SECS")]
    pub origin_timeout: u64,

    /// Value of the Content-Signal response header
    #[arg(long, env = "CONTENT_SIGNAL", default_value = DEFAULT_CONTENT_SIGNAL, value_name = "SIGNAL")]
    pub content_signal: String,

    /// Extra CSS selectors to strip, comma separated
    #[arg(long, env = "STRIP_SELECTORS", default_value = "", value_name = "SELECTORS")]
    pub strip_selectors: String,

    /// Encoding or model name used for token counting
    #[arg(long, env = "TOKEN_MODEL", default_value = DEFAULT_TOKEN_MODEL, value_name = "MODEL")]
    pub token_model: String,

    /// Log level (DEBUG, INFO, WARN, ERROR); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", value_name = "LEVEL")]
    pub log_level: String,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR, value_name = "ADDR")]
    pub listen_addr: SocketAddr,

    /// Check the local health endpoint and exit 0 (healthy) or 1
    #[arg(long)]
    pub healthcheck: bool,
}

impl Config {
    /// Extra strip selectors, trimmed, blanks dropped.
    pub fn extra_selectors(&self) -> Vec<String> {
        self.strip_selectors
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `tracing` filter directive for `log_level`. Unknown levels map to `info`.
    pub fn log_filter(&self) -> &'static str {
        match self.log_level.trim().to_uppercase().as_str() {
            "DEBUG" => "debug",
            "WARN" | "WARNING" => "warn",
            "ERROR" => "error",
            _ => "info",
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.origin_base_url.clone(),
            timeout: self.origin_timeout,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin_base_url: DEFAULT_ORIGIN_BASE_URL.to_string(),
            origin_timeout: 10,
            content_signal: DEFAULT_CONTENT_SIGNAL.to_string(),
            strip_selectors: String::new(),
            token_model: DEFAULT_TOKEN_MODEL.to_string(),
            log_level: "INFO".to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            healthcheck: false,
        }
    }
}
