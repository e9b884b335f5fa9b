//! Converts rendered HTML pages into Markdown for machine readers.
//!
//! The pipeline lives in [`convert`]; [`fetch`] talks to the origin and
//! [`tokens`] estimates the size of the result.

pub mod content;
pub mod convert;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod frontmatter;
pub mod images;
pub mod markdown;
pub mod metadata;
pub mod parse;
pub mod selectors;
pub mod tables;
pub mod tokens;

pub use content::Landmark;
pub use convert::{Conversion, Converter, html_to_markdown};
pub use error::{Result, SidecarError};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, MAX_REDIRECTS, OriginClient, USER_AGENT, is_html};
pub use frontmatter::{build_front_matter, prepend_front_matter};
pub use images::strip_images;
pub use markdown::{normalize_blank_runs, render_markdown};
pub use metadata::Metadata;
pub use parse::Document;
pub use selectors::{BUILTIN_STRIP_SELECTORS, SelectorSet};
pub use tables::promote_header_rows;
pub use tokens::{DEFAULT_TOKEN_MODEL, TokenCounter, approximate_tokens};
