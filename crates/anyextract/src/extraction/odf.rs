//! OpenDocument (ODT/ODS/ODP/ODG/ODF) content walking.
//!
//! Text lives in `text:p` and `text:h` elements. Only the outermost ones are
//! taken; a paragraph nested inside another (e.g. in a note body) contributes
//! through its ancestor. Paragraphs below `presentation:notes` are speaker
//! notes and are collected separately, after all body text. Content parts are
//! visited in case-insensitive path order, so `content.xml` precedes
//! `Object 1/content.xml`.

use crate::error::{AnyExtractError, Result};
use crate::extraction::markup::{Element, MarkupNode, parse_markup};
use crate::extraction::walker::{DispatchTable, Walker};
use crate::types::{ArchivePart, ContentItem, ContentKind};
use once_cell::sync::Lazy;
use regex::Regex;

const MAIN_CONTENT_PART: &str = "content.xml";
static OBJECT_CONTENT_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Object \d+/content\.xml$").expect("valid regex"));
const NOTES_TAG: &str = "presentation:notes";

/// Archive paths the ODF adapter needs.
pub fn is_odf_part(path: &str) -> bool {
    path == MAIN_CONTENT_PART || OBJECT_CONTENT_PART.is_match(path)
}

/// Speaker notes met while walking, in visit order.
#[derive(Debug, Default)]
pub struct OdfAccumulator {
    pub notes: Vec<String>,
}

static ODF_TABLE: Lazy<DispatchTable<OdfAccumulator>> = Lazy::new(|| {
    DispatchTable::new()
        .handle("text:p", handle_paragraph)
        .handle("text:h", handle_heading)
        .without_loose_text()
});

fn handle_paragraph<'a>(element: &'a Element, walker: &mut Walker<'a, OdfAccumulator>) -> Result<Vec<ContentItem>> {
    Ok(paragraph(element, ContentKind::Paragraph, walker))
}

fn handle_heading<'a>(element: &'a Element, walker: &mut Walker<'a, OdfAccumulator>) -> Result<Vec<ContentItem>> {
    Ok(paragraph(element, ContentKind::Heading, walker))
}

fn paragraph(element: &Element, kind: ContentKind, walker: &mut Walker<'_, OdfAccumulator>) -> Vec<ContentItem> {
    let mut text = String::new();
    push_paragraph_text(element, &mut text);

    if walker.has_ancestor(NOTES_TAG) {
        if !text.trim().is_empty() {
            walker.context_mut().notes.push(text);
        }
        return Vec::new();
    }
    vec![ContentItem::new(kind, text)]
}

fn push_paragraph_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            MarkupNode::Text(text) => out.push_str(text),
            MarkupNode::Element(inner) => match inner.name.as_str() {
                "text:tab" => out.push('\t'),
                "text:line-break" => out.push('\n'),
                "text:s" => {
                    let count = inner.attr("text:c").and_then(|c| c.parse::<usize>().ok()).unwrap_or(1);
                    out.extend(std::iter::repeat_n(' ', count));
                }
                _ => push_paragraph_text(inner, out),
            },
        }
    }
}

/// Body chunks (one per content part, in path order) and speaker notes.
#[derive(Debug, Default)]
pub struct OdfContent {
    pub chunks: Vec<String>,
    pub notes: Vec<String>,
}

impl OdfContent {
    /// Body chunks followed by each note, separated by blank lines.
    pub fn render(&self) -> String {
        self.chunks
            .iter()
            .chain(self.notes.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Walk `content.xml` and every embedded `Object N/content.xml`.
///
/// # Errors
///
/// `CorruptedDocument` without `content.xml`; `MalformedDocument` for
/// unparseable markup.
pub fn walk_odf(mut parts: Vec<ArchivePart>, max_depth: usize) -> Result<OdfContent> {
    if !parts.iter().any(|part| part.path == MAIN_CONTENT_PART) {
        return Err(AnyExtractError::corrupted_document(
            "OpenDocument package has no content.xml",
        ));
    }
    parts.retain(|part| is_odf_part(&part.path));
    parts.sort_by_key(|part| part.path.to_lowercase());

    let roots = parts
        .iter()
        .map(|part| parse_markup(&part.content, max_depth))
        .collect::<Result<Vec<_>>>()?;

    let mut walker = Walker::new(&*ODF_TABLE, OdfAccumulator::default(), max_depth);
    let mut chunks = Vec::new();
    for root in &roots {
        let items = walker.walk(root)?;
        let chunk = items
            .iter()
            .map(|item| item.content.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
    }

    let notes = walker.into_context().notes;
    tracing::debug!(parts = parts.len(), chunks = chunks.len(), notes = notes.len(), "walked OpenDocument content");
    Ok(OdfContent { chunks, notes })
}
