//! Structural patterns identifying page chrome.
//!
//! A [`SelectorSet`] is the built-in strip list plus any per-deployment
//! extras, compiled once. It is never mutated after construction and is
//! passed explicitly to every conversion.

use scraper::{ElementRef, Selector};

use crate::{Result, SidecarError};

/// CSS selectors for non-content elements removed from every content root.
pub const BUILTIN_STRIP_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "script",
    "style",
    "noscript",
    "iframe",
    "object",
    "embed",
    ".cookie-banner",
    ".cookie-consent",
    "#cookie-banner",
    "#cookie-consent",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    ".breadcrumb",
    ".pagination",
    ".sidebar",
    "aside",
    "form",
];

/// Immutable, compiled list of strip selectors.
///
/// # Example
///
/// ```rust
/// use markdown_sidecar_core::SelectorSet;
///
/// let set = SelectorSet::with_extra(["#newsletter", ".ad-slot"]).unwrap();
/// assert_eq!(set.patterns().last().map(String::as_str), Some(".ad-slot"));
/// ```
#[derive(Debug, Clone)]
pub struct SelectorSet {
    patterns: Vec<String>,
    compiled: Vec<Selector>,
}

impl SelectorSet {
    /// The built-in set with no deployment extras.
    pub fn builtin() -> Self {
        let (patterns, compiled): (Vec<String>, Vec<Selector>) = BUILTIN_STRIP_SELECTORS
            .iter()
            .filter_map(|pattern| Selector::parse(pattern).ok().map(|sel| (pattern.to_string(), sel)))
            .unzip();

        Self { patterns, compiled }
    }

    /// The built-in set followed by `extra`, in the given order.
    ///
    /// Blank entries are skipped and surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`SidecarError::InvalidSelector`] for the first extra pattern
    /// that is not a valid CSS selector.
    pub fn with_extra<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::builtin();

        for pattern in extra {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }

            let selector = Selector::parse(pattern).map_err(|e| SidecarError::InvalidSelector {
                selector: pattern.to_string(),
                reason: e.to_string(),
            })?;

            set.patterns.push(pattern.to_string());
            set.compiled.push(selector);
        }

        Ok(set)
    }

    /// Source text of every pattern, built-ins first.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.compiled.iter()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Whether `element` matches any pattern in the set.
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.compiled.iter().any(|selector| selector.matches(element))
    }
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_compiles_every_pattern() {
        let set = SelectorSet::builtin();
        assert_eq!(set.len(), BUILTIN_STRIP_SELECTORS.len());
        assert_eq!(set.patterns()[0], "nav");
    }

    #[test]
    fn test_extra_patterns_follow_builtins() {
        let set = SelectorSet::with_extra([" .promo ", "", "#share"]).unwrap();
        assert_eq!(set.len(), BUILTIN_STRIP_SELECTORS.len() + 2);

        let tail = &set.patterns()[BUILTIN_STRIP_SELECTORS.len()..];
        assert_eq!(tail, [".promo".to_string(), "#share".to_string()]);
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let result = SelectorSet::with_extra(["div[data-x"]);
        assert!(matches!(result, Err(SidecarError::InvalidSelector { ref selector, .. }) if selector == "div[data-x"));
    }

    #[test]
    fn test_matches() {
        let html = scraper::Html::parse_fragment(r#"<div class="sidebar"></div><p>Keep</p>"#);
        let set = SelectorSet::builtin();

        let div = html.select(&Selector::parse("div").unwrap()).next().unwrap();
        let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();

        assert!(set.matches(&div));
        assert!(!set.matches(&p));
    }
}
