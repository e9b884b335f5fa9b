//! Error types for the conversion pipeline and origin fetching.
//!
//! Most pipeline stages absorb their failures and degrade the output
//! instead of failing a request (see [`crate::Conversion::degraded`]).
//! [`SidecarError`] is what those stages report internally, and what the
//! origin client returns when the upstream exchange itself fails.
//!
//! # Example
//!
//! ```rust
//! use markdown_sidecar_core::{SelectorSet, SidecarError};
//!
//! match SelectorSet::with_extra(["[[broken"]) {
//!     Err(SidecarError::InvalidSelector { selector, .. }) => assert_eq!(selector, "[[broken"),
//!     other => panic!("expected an invalid selector error, got {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Main error type for sidecar operations.
#[derive(Error, Debug)]
pub enum SidecarError {
    /// HTTP request errors from reqwest.
    ///
    /// Connection refused, DNS failures, TLS errors and body read failures
    /// all end up here.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The origin did not answer within the configured timeout.
    #[error("Origin request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The origin kept redirecting past the hop limit.
    #[error("Origin exceeded {limit} redirects")]
    TooManyRedirects { limit: usize },

    /// The origin URL could not be built or parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A strip selector failed to compile.
    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The streaming HTML rewriter rejected the content root markup.
    #[error("Failed to rewrite HTML: {0}")]
    RewriteError(String),

    /// Markdown rendering of the content root failed.
    #[error("Failed to render Markdown: {0}")]
    RenderError(String),
}

/// Result type alias for [`SidecarError`].
pub type Result<T> = std::result::Result<T, SidecarError>;
