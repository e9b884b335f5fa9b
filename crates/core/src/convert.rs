//! The HTML → Markdown pipeline.
//!
//! Stages, in order: metadata extraction, content root selection, chrome
//! stripping, image removal, Markdown rendering, blank-line normalisation
//! and front matter. The pipeline never fails: when image removal or
//! rendering errors, the body degrades to empty while the metadata
//! extracted earlier is kept, and [`Conversion::degraded`] records why.
//!
//! # Example
//!
//! ```rust
//! use markdown_sidecar_core::Converter;
//!
//! let html = r#"<html><head><title>Hi</title></head>
//!     <body><nav>Menu</nav><main><h1>Welcome</h1></main></body></html>"#;
//!
//! let conversion = Converter::default().convert(html);
//! assert_eq!(conversion.markdown, "---\ntitle: \"Hi\"\n---\n\n# Welcome");
//! ```

use crate::content::Landmark;
use crate::frontmatter::{build_front_matter, prepend_front_matter};
use crate::images::strip_images;
use crate::markdown::{normalize_blank_runs, render_markdown};
use crate::tables::promote_header_rows;
use crate::{Document, Metadata, Result, SelectorSet, SidecarError};

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion {
    /// Final text: optional front matter, then the rendered body.
    pub markdown: String,
    pub metadata: Metadata,
    /// Which landmark served as the content root.
    pub landmark: Landmark,
    /// Number of chrome elements removed from the content root.
    pub stripped: usize,
    /// Set when the body was dropped because a stage failed.
    pub degraded: Option<SidecarError>,
}

/// Runs the pipeline with a fixed [`SelectorSet`].
#[derive(Debug, Clone, Default)]
pub struct Converter {
    selectors: SelectorSet,
}

impl Converter {
    pub fn new(selectors: SelectorSet) -> Self {
        Self { selectors }
    }

    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }

    /// Convert a full HTML document.
    pub fn convert(&self, html: &str) -> Conversion {
        let mut document = Document::parse(html);

        let metadata = document.extract_metadata();
        let landmark = document.content_root();
        let stripped = document.strip_chrome(landmark, &self.selectors);
        let content_html = document.content_html(landmark);

        let (markdown, degraded) = assemble(&metadata, render_body(&content_html));

        Conversion { markdown, metadata, landmark, stripped, degraded }
    }
}

/// Convert `html` with the given selectors. Shorthand for
/// `Converter::new(selectors.clone()).convert(html)`.
pub fn html_to_markdown(html: &str, selectors: &SelectorSet) -> Conversion {
    Converter::new(selectors.clone()).convert(html)
}

fn render_body(content_html: &str) -> Result<String> {
    let without_images = strip_images(content_html)?;
    let with_headers = promote_header_rows(&without_images)?;
    let markdown = render_markdown(&with_headers)?;
    Ok(normalize_blank_runs(&markdown).trim().to_string())
}

/// Front matter plus body. A failed body becomes empty and is reported
/// back as the degrade reason.
fn assemble(metadata: &Metadata, body: Result<String>) -> (String, Option<SidecarError>) {
    let (body, degraded) = match body {
        Ok(body) => (body, None),
        Err(err) => (String::new(), Some(err)),
    };

    (prepend_front_matter(&build_front_matter(metadata), &body), degraded)
}
