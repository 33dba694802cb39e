//! DrawingML text bodies, shared by slides and spreadsheet drawings.
//!
//! Only `a:p` paragraphs that carry at least one `a:t` run produce text; the
//! runs of a paragraph are concatenated without separators.

use crate::error::Result;
use crate::extraction::markup::Element;
use crate::extraction::walker::{DispatchTable, Walker};
use crate::types::{ContentItem, ContentKind};
use once_cell::sync::Lazy;

static DRAWING_TABLE: Lazy<DispatchTable<()>> = Lazy::new(|| {
    DispatchTable::new()
        .handle("a:p", handle_paragraph)
        .without_loose_text()
});

fn handle_paragraph<'a>(element: &'a Element, _walker: &mut Walker<'a, ()>) -> Result<Vec<ContentItem>> {
    let runs = element.find_all("a:t");
    if runs.is_empty() {
        return Ok(Vec::new());
    }
    let text: String = runs.iter().map(|run| run.text()).collect();
    Ok(vec![ContentItem::new(ContentKind::Paragraph, text)])
}

/// Paragraph items of a DrawingML part, in document order.
pub fn drawing_paragraphs(root: &Element, max_depth: usize) -> Result<Vec<ContentItem>> {
    Walker::new(&*DRAWING_TABLE, (), max_depth).walk(root)
}

/// Paragraph texts of a DrawingML part joined with newlines.
pub fn drawing_text(root: &Element, max_depth: usize) -> Result<String> {
    let paragraphs = drawing_paragraphs(root, max_depth)?;
    Ok(paragraphs
        .iter()
        .map(|item| item.content.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}
