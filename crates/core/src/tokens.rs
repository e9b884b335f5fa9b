//! Token count estimation.
//!
//! A [`TokenCounter`] is built once for a named encoding (or OpenAI model
//! name) and then shared read-only. When the vocabulary cannot be loaded,
//! or the crate is built without the `tiktoken` feature, counts fall back
//! to [`approximate_tokens`].

use std::fmt;

#[cfg(feature = "tiktoken")]
use tiktoken_rs::CoreBPE;

/// Default encoding name.
pub const DEFAULT_TOKEN_MODEL: &str = "cl100k_base";

/// Counts tokens for one encoding.
pub struct TokenCounter {
    model: String,
    #[cfg(feature = "tiktoken")]
    bpe: Option<CoreBPE>,
}

impl TokenCounter {
    /// Loads the vocabulary for `model`.
    ///
    /// Accepts encoding names (`cl100k_base`, `o200k_base`, `p50k_base`,
    /// `p50k_edit`, `r50k_base`/`gpt2`) or model names such as `gpt-4o`.
    /// Unknown names produce a counter that always approximates.
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            #[cfg(feature = "tiktoken")]
            bpe: load_bpe(model),
        }
    }

    /// A counter that always uses the length-based approximation.
    pub fn approximate() -> Self {
        Self {
            model: String::new(),
            #[cfg(feature = "tiktoken")]
            bpe: None,
        }
    }

    /// Name this counter was built for.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether counts come from the real tokenizer.
    pub fn is_precise(&self) -> bool {
        #[cfg(feature = "tiktoken")]
        {
            self.bpe.is_some()
        }
        #[cfg(not(feature = "tiktoken"))]
        {
            false
        }
    }

    /// Number of tokens in `text`. Empty text is always 0.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        #[cfg(feature = "tiktoken")]
        if let Some(bpe) = &self.bpe {
            return bpe.encode_ordinary(text).len();
        }

        approximate_tokens(text)
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_MODEL)
    }
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .field("precise", &self.is_precise())
            .finish()
    }
}

/// Roughly four bytes per token, rounded down.
pub fn approximate_tokens(text: &str) -> usize {
    text.len() / 4
}

#[cfg(feature = "tiktoken")]
fn load_bpe(model: &str) -> Option<CoreBPE> {
    let loaded = match model {
        "cl100k_base" => tiktoken_rs::cl100k_base(),
        "o200k_base" => tiktoken_rs::o200k_base(),
        "p50k_base" => tiktoken_rs::p50k_base(),
        "p50k_edit" => tiktoken_rs::p50k_edit(),
        "r50k_base" | "gpt2" => tiktoken_rs::r50k_base(),
        other => tiktoken_rs::get_bpe_from_model(other),
    };

    loaded.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(TokenCounter::default().count(""), 0);
        assert_eq!(TokenCounter::approximate().count(""), 0);
    }

    #[test]
    fn test_positive_count() {
        let counter = TokenCounter::default();
        assert!(counter.count("Hello, this is a test sentence.") > 0);
    }

    #[test]
    fn test_longer_text_more_tokens() {
        let counter = TokenCounter::default();
        let short = counter.count("Hi");
        let long = counter.count("This is a much longer sentence with many more tokens in it.");
        assert!(long > short, "short={short}, long={long}");
    }

    #[test]
    fn test_prefix_never_exceeds_whole() {
        let text = "Markdown for agents: fetch, strip, convert and count.";
        let counter = TokenCounter::approximate();
        for end in (0..=text.len()).filter(|i| text.is_char_boundary(*i)) {
            assert!(counter.count(&text[..end]) <= counter.count(text));
        }
    }

    #[test]
    fn test_fallback_is_floor_of_quarter_length() {
        assert_eq!(approximate_tokens("abc"), 0);
        assert_eq!(approximate_tokens("abcd"), 1);
        assert_eq!(approximate_tokens("abcdefghi"), 2);
        assert_eq!(TokenCounter::approximate().count("abcdefgh"), 2);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let counter = TokenCounter::new("no-such-encoding");
        assert!(!counter.is_precise());
        assert_eq!(counter.model(), "no-such-encoding");
        assert_eq!(counter.count("twelve chars"), 3);
    }

    #[cfg(feature = "tiktoken")]
    #[test]
    fn test_known_encoding_is_precise() {
        let counter = TokenCounter::new("cl100k_base");
        assert!(counter.is_precise());
        assert_eq!(counter.count("hello world"), 2);
    }
}
