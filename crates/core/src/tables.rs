use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::Element;

use crate::{Result, SidecarError};

#[derive(Debug, Default)]
struct TableState {
    has_thead: bool,
    rows_seen: usize,
    in_header_row: bool,
}

/// Turns the first row of every table without a `<thead>` into header cells.
///
/// The Markdown renderer only emits a pipe table when it finds header
/// cells; layout tables from a CMS rarely have any. Nested tables are
/// tracked separately. Expects serialized markup with explicit end tags.
///
/// # Errors
///
/// Returns [`SidecarError::RewriteError`] if the rewriter rejects the input
/// or produces invalid UTF-8.
pub fn promote_header_rows(html: &str) -> Result<String> {
    let tables: Rc<RefCell<Vec<TableState>>> = Rc::default();
    let on_table = Rc::clone(&tables);
    let on_thead = Rc::clone(&tables);
    let on_row = Rc::clone(&tables);
    let on_cell = Rc::clone(&tables);

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("table", move |el: &mut Element| {
                    on_table.borrow_mut().push(TableState::default());
                    let stack = Rc::clone(&on_table);
                    el.on_end_tag(lol_html::end_tag!(move |_| {
                        stack.borrow_mut().pop();
                        Ok(())
                    }))
                }),
                lol_html::element!("thead", move |_| {
                    if let Some(table) = on_thead.borrow_mut().last_mut() {
                        table.has_thead = true;
                    }
                    Ok(())
                }),
                lol_html::element!("tr", move |_| {
                    if let Some(table) = on_row.borrow_mut().last_mut() {
                        table.in_header_row = table.rows_seen == 0 && !table.has_thead;
                        table.rows_seen += 1;
                    }
                    Ok(())
                }),
                lol_html::element!("td", move |el: &mut Element| {
                    let promote = on_cell.borrow().last().is_some_and(|table| table.in_header_row);
                    if promote {
                        el.set_tag_name("th")?;
                    }
                    Ok(())
                }),
            ],
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
