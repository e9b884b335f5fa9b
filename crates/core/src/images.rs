use crate::{Result, SidecarError};

/// Removes every `<img>` element from an HTML fragment.
///
/// Unlike chrome stripping this is not configurable: images, alt text
/// included, never reach the rendered output.
///
/// # Errors
///
/// Returns [`SidecarError::RewriteError`] if the rewriter rejects the input
/// or produces invalid UTF-8.
pub fn strip_images(html: &str) -> Result<String> {
    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("img", |el| {
                el.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| SidecarError::RewriteError(e.to_string()))?;
    rewriter.end().map_err(|e| SidecarError::RewriteError(e.to_string()))?;

    String::from_utf8(output).map_err(|e| SidecarError::RewriteError(e.to_string()))
}
