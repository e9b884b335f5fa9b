//! Markdown rendering and blank-line normalisation.

use crate::Result;
#[cfg(feature = "markdown")]
use crate::SidecarError;

/// Maximum number of consecutive blank lines kept by [`normalize_blank_runs`].
pub const MAX_BLANK_RUN: usize = 2;

/// Convert an HTML fragment to Markdown.
///
/// ATX headings, `-` bullets, fenced code blocks (keeping a `language-*`
/// class as the info string), inline links with targets left as given,
/// pipe tables and `>` blockquotes.
///
/// # Errors
///
/// Returns [`SidecarError::RenderError`] if the converter fails.
#[cfg(feature = "markdown")]
pub fn render_markdown(html: &str) -> Result<String> {
    use htmd::HtmlToMarkdown;
    use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, LinkStyle, Options};

    let options = Options {
        heading_style: HeadingStyle::Atx,
        bullet_list_marker: BulletListMarker::Dash,
        code_block_style: CodeBlockStyle::Fenced,
        link_style: LinkStyle::Inlined,
        ..Default::default()
    };

    HtmlToMarkdown::builder()
        .options(options)
        .build()
        .convert(html)
        .map_err(|e| SidecarError::RenderError(e.to_string()))
}

/// Plain text fallback when the `markdown` feature is disabled.
#[cfg(not(feature = "markdown"))]
pub fn render_markdown(html: &str) -> Result<String> {
    let fragment = scraper::Html::parse_fragment(html);
    Ok(fragment.root_element().text().collect())
}

/// Collapse runs of blank lines to at most [`MAX_BLANK_RUN`].
///
/// Whitespace-only lines count as blank and are emitted empty. Applying
/// this twice gives the same result as applying it once.
///
/// ```rust
/// use markdown_sidecar_core::normalize_blank_runs;
///
/// assert_eq!(normalize_blank_runs("a\n\n\n\n\n\nb"), "a\n\n\nb");
/// ```
pub fn normalize_blank_runs(text: &str) -> String {
    let mut lines = Vec::new();
    let mut blank_run = 0;

    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= MAX_BLANK_RUN {
                lines.push("");
            }
        } else {
            blank_run = 0;
            lines.push(line);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn longest_blank_run(text: &str) -> usize {
        text.split('\n')
            .fold((0, 0), |(longest, current), line| {
                let current = if line.trim().is_empty() { current + 1 } else { 0 };
                (longest.max(current), current)
            })
            .0
    }

    #[test]
    fn test_five_blank_lines_become_two() {
        let text = "first\n\n\n\n\n\nsecond";
        assert_eq!(longest_blank_run(text), 5);

        let normalized = normalize_blank_runs(text);
        assert_eq!(normalized, "first\n\n\nsecond");
        assert_eq!(longest_blank_run(&normalized), 2);
    }

    #[test]
    fn test_idempotent() {
        let text = "a\n \n\t\n\n\nb\n\nc\n\n\n\n";
        let once = normalize_blank_runs(text);
        assert_eq!(normalize_blank_runs(&once), once);
    }

    #[test]
    fn test_short_runs_untouched() {
        let text = "a\n\nb\n\n\nc";
        assert_eq!(normalize_blank_runs(text), text);
    }

    #[test]
    fn test_whitespace_lines_emptied() {
        assert_eq!(normalize_blank_runs("a\n   \nb"), "a\n\nb");
    }

    #[cfg(feature = "markdown")]
    mod rendering {
        use super::super::*;

        #[test]
        fn test_atx_headings() {
            let md = render_markdown("<h1>One</h1><h3>Three</h3><h6>Six</h6>").unwrap();
            assert!(md.contains("# One"));
            assert!(md.contains("### Three"));
            assert!(md.contains("###### Six"));
        }

        #[test]
        fn test_links_keep_targets() {
            let html = r#"<p>See <a href="/relative/path">docs</a> and <a href="https://x.com">x</a>.</p>"#;
            let md = render_markdown(html).unwrap();
            assert!(md.contains("[docs](/relative/path)"));
            assert!(md.contains("[x](https://x.com)"));
        }

        #[test]
        fn test_dash_bullets_and_ordered_lists() {
            let md = render_markdown("<ul><li>One</li><li>Two</li></ul><ol><li>First</li></ol>").unwrap();
            let bullet = |item: &str| md.lines().any(|line| line.starts_with('-') && line.contains(item));
            assert!(bullet("One"));
            assert!(bullet("Two"));
            assert!(md.lines().any(|line| line.starts_with("1.") && line.contains("First")));
        }

        #[test]
        fn test_emphasis() {
            let md = render_markdown("<p><strong>bold</strong> and <em>soft</em></p>").unwrap();
            assert!(md.contains("**bold**"));
            assert!(md.contains("*soft*") || md.contains("_soft_"));
        }

        #[test]
        fn test_fenced_code_block() {
            let md = render_markdown(r#"<pre><code class="language-python">print("Hello, World!")</code></pre>"#)
                .unwrap();
            assert!(md.contains("```"));
            assert!(md.contains(r#"print("Hello, World!")"#));
        }

        #[test]
        fn test_blockquote() {
            let md = render_markdown("<blockquote><p>Ein Zitat</p></blockquote>").unwrap();
            assert!(md.contains("> Ein Zitat"));
        }

        #[test]
        fn test_table() {
            let html = r#"
                <table>
                    <thead><tr><th>Column 1</th><th>Column 2</th></tr></thead>
                    <tbody><tr><td>Data 1</td><td>Data 2</td></tr></tbody>
                </table>
            "#;
            let md = render_markdown(html).unwrap();
            let lines: Vec<&str> = md.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

            assert_eq!(lines.len(), 3, "{md}");
            assert!(lines[0].starts_with('|') && lines[0].contains("Column 1"));
            assert!(lines[1].starts_with("| ---") && lines[1].chars().all(|c| matches!(c, '|' | '-' | ' ')));
            assert!(lines[2].starts_with('|') && lines[2].contains("Data 2"));
        }

        #[test]
        fn test_presentation_markup_dropped() {
            let md = render_markdown(r#"<div><span style="color:red">Plain</span></div>"#).unwrap();
            assert_eq!(md.trim(), "Plain");
        }
    }
}
