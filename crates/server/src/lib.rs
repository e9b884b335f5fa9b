//! HTTP sidecar serving Markdown renditions of an HTML origin.
//!
//! A reverse proxy routes requests that prefer `text/markdown` here; the
//! sidecar fetches the same path from the origin, converts the HTML with
//! [`markdown_sidecar_core`] and answers with Markdown plus a few
//! informational headers.

pub mod app;
pub mod config;
pub mod health;
pub mod logging;
pub mod proxy;

pub use app::{AppState, create_app, serve};
pub use config::Config;
pub use health::{HealthStatus, check_health};
pub use proxy::{Converted, ProxyOutcome};
