//! HTML parsing.
//!
//! A [`Document`] is owned by exactly one conversion; the content-root
//! stages in [`crate::content`] mutate it in place.
//!
//! # Example
//!
//! ```rust
//! use markdown_sidecar_core::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! ```

use scraper::{Html, Selector};

use crate::{Result, SidecarError};

/// A parsed HTML document.
///
/// Parsing is lenient: any input, including an empty string or a bare
/// fragment, yields a document with `html`, `head` and `body` elements.
pub struct Document {
    pub(crate) html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Text of the first `<title>` in `<head>` whose trimmed text is non-empty.
    ///
    /// Titles elsewhere, such as inline SVG titles, are ignored.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("head > title").ok()?;
        self.html
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|title| !title.is_empty())
    }

    /// Trimmed `content` of the first `<meta {attr}="{value}">` that has a
    /// non-empty one.
    ///
    /// ```rust
    /// use markdown_sidecar_core::Document;
    ///
    /// let doc = Document::parse(r#"<head><meta property="og:image" content=" /a.png "></head>"#);
    /// assert_eq!(doc.meta_content("property", "og:image"), Some("/a.png".to_string()));
    /// ```
    pub fn meta_content(&self, attr: &str, value: &str) -> Option<String> {
        let selector = Selector::parse(&format!("meta[{attr}=\"{value}\"]")).ok()?;
        self.html
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(str::to_string)
    }
}

pub(crate) fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| SidecarError::InvalidSelector { selector: selector.to_string(), reason: e.to_string() })
}
