//! Content root selection and chrome stripping.
//!
//! The content root is the single subtree treated as "the content". It is
//! chosen by a fixed landmark priority, narrowest first, and always exists:
//! when no landmark matches, the whole `<body>` is used.

use std::fmt;

use scraper::ElementRef;

use crate::parse::compile;
use crate::{Document, SelectorSet};

/// Structural landmark that can serve as a content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    /// `<main>`
    Main,
    /// `<article>`
    Article,
    /// `#content`
    ContentId,
    /// `.content`
    ContentClass,
    /// `<body>`, the fallback.
    Body,
}

impl Landmark {
    /// Landmarks in the order they are tried.
    pub const PRIORITY: [Landmark; 5] =
        [Landmark::Main, Landmark::Article, Landmark::ContentId, Landmark::ContentClass, Landmark::Body];

    /// CSS selector for this landmark.
    pub fn selector(self) -> &'static str {
        match self {
            Landmark::Main => "main",
            Landmark::Article => "article",
            Landmark::ContentId => "#content",
            Landmark::ContentClass => ".content",
            Landmark::Body => "body",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl Document {
    /// Picks the content root: the first landmark in [`Landmark::PRIORITY`]
    /// that matches at least one element.
    ///
    /// ```rust
    /// use markdown_sidecar_core::{Document, Landmark};
    ///
    /// let doc = Document::parse(r#"<div class="content">x</div><article>y</article>"#);
    /// assert_eq!(doc.content_root(), Landmark::Article);
    /// ```
    pub fn content_root(&self) -> Landmark {
        Landmark::PRIORITY
            .into_iter()
            .find(|landmark| self.first_match(*landmark).is_some())
            .unwrap_or(Landmark::Body)
    }

    /// Markup inside the content root.
    ///
    /// When several elements match the landmark, the first in document
    /// order wins.
    pub fn content_html(&self, landmark: Landmark) -> String {
        self.root_ref(landmark).inner_html()
    }

    /// Detaches every descendant of the content root that matches any
    /// selector in `selectors`, along with its subtree.
    ///
    /// Removal can make a new element match (a sibling combinator, say), so
    /// passes repeat until one removes nothing. The root itself is never
    /// removed. Returns the number of distinct elements removed.
    pub fn strip_chrome(&mut self, landmark: Landmark, selectors: &SelectorSet) -> usize {
        let mut removed = 0;

        loop {
            let root = self.root_ref(landmark);
            let root_id = root.id();

            let mut doomed: Vec<_> = selectors
                .iter()
                .flat_map(|selector| root.select(selector))
                .map(|el| el.id())
                .filter(|id| *id != root_id)
                .collect();
            doomed.sort();
            doomed.dedup();

            if doomed.is_empty() {
                return removed;
            }

            for id in &doomed {
                if let Some(mut node) = self.html.tree.get_mut(*id) {
                    node.detach();
                }
            }
            removed += doomed.len();
        }
    }

    fn first_match(&self, landmark: Landmark) -> Option<ElementRef<'_>> {
        let selector = compile(landmark.selector()).ok()?;
        self.html.select(&selector).next()
    }

    fn root_ref(&self, landmark: Landmark) -> ElementRef<'_> {
        self.first_match(landmark)
            .or_else(|| self.first_match(Landmark::Body))
            .unwrap_or_else(|| self.html.root_element())
    }
}
