use crate::Metadata;

/// Delimiter line wrapping the front-matter block.
pub const DELIMITER: &str = "---";

/// Build a YAML front-matter block from metadata.
///
/// One `key: "value"` line per non-empty field, in [`Metadata::fields`]
/// order, between two `---` lines. Returns an empty string when every
/// field is empty.
///
/// ```rust
/// use markdown_sidecar_core::{Metadata, build_front_matter};
///
/// let metadata = Metadata { title: "Hello".into(), ..Default::default() };
/// assert_eq!(build_front_matter(&metadata), "---\ntitle: \"Hello\"\n---");
/// assert_eq!(build_front_matter(&Metadata::default()), "");
/// ```
pub fn build_front_matter(metadata: &Metadata) -> String {
    let lines: Vec<String> = metadata
        .fields()
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}: {}", yaml_quote(value)))
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    format!("{DELIMITER}\n{}\n{DELIMITER}", lines.join("\n"))
}

/// Prepend front matter to a rendered body, separated by one blank line.
pub fn prepend_front_matter(front_matter: &str, body: &str) -> String {
    if front_matter.is_empty() { body.to_string() } else { format!("{front_matter}\n\n{body}") }
}

/// Double-quote a string for YAML
fn yaml_quote(s: &str) -> String {
    format!(
        "\"{}\"",
        s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    )
}
