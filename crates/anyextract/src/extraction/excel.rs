//! SpreadsheetML (XLSX) part walking.
//!
//! Worksheets, drawing text, chart values and embedded images are emitted in
//! archive order. Cell values follow the cell type:
//!
//! - `t="inlineStr"`: the text of `is`
//! - `t="s"`: an index into the shared-string table from `xl/sharedStrings.xml`
//! - anything else: the raw `v` text, so numbers, booleans and cached formula
//!   results appear exactly as stored

use crate::error::{AnyExtractError, Result};
use crate::extraction::drawingml::drawing_text;
use crate::extraction::markup::{Element, parse_markup};
use crate::extraction::walker::{DispatchTable, Walker};
use crate::types::{ArchivePart, ContentItem, ContentKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static SHEET_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^xl/worksheets/sheet\d+\.xml$").expect("valid regex"));
static DRAWING_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^xl/drawings/drawing\d+\.xml$").expect("valid regex"));
static CHART_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^xl/charts/chart\d+\.xml$").expect("valid regex"));
static IMAGE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^xl/media/image\d+\.(png|jpeg|jpg|webp)$").expect("valid regex"));
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Archive paths the Sheet adapter needs. Images are only selected when they
/// will be described.
pub fn is_xlsx_part(path: &str, with_media: bool) -> bool {
    path == SHARED_STRINGS_PART
        || SHEET_PART.is_match(path)
        || DRAWING_PART.is_match(path)
        || CHART_PART.is_match(path)
        || (with_media && IMAGE_PART.is_match(path))
}

/// Parse the shared-string table. Rich-text items (`si/r/t`) are concatenated;
/// phonetic hints (`rPh`) are skipped.
pub fn parse_shared_strings(xml: &[u8], max_depth: usize) -> Result<Vec<String>> {
    let root = parse_markup(xml, max_depth)?;
    Ok(root.find_all("si").into_iter().map(rich_text).collect())
}

fn rich_text(item: &Element) -> String {
    let mut text = String::new();
    for child in item.elements() {
        match child.name.as_str() {
            "t" => text.push_str(&child.text()),
            "r" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            }
            _ => {}
        }
    }
    text
}

/// Walk context of worksheets: the shared-string table.
type SharedStrings = Vec<String>;

static SHEET_TABLE: Lazy<DispatchTable<SharedStrings>> =
    Lazy::new(|| DispatchTable::new().handle("c", handle_cell).without_loose_text());

fn handle_cell<'a>(element: &'a Element, walker: &mut Walker<'a, SharedStrings>) -> Result<Vec<ContentItem>> {
    let value = match element.attr("t") {
        Some("inlineStr") => element.child("is").map(rich_text).unwrap_or_default(),
        Some("s") => {
            let Some(raw) = element.child("v").map(Element::text) else {
                return Ok(Vec::new());
            };
            let shared = walker.context();
            let index: usize = raw.trim().parse().map_err(|_| {
                AnyExtractError::corrupted_document(format!(
                    "Cell {} has invalid shared string index '{}'",
                    element.attr("r").unwrap_or("?"),
                    raw
                ))
            })?;
            shared.get(index).cloned().ok_or_else(|| {
                AnyExtractError::corrupted_document(format!(
                    "Cell {} references shared string {} but {} only holds {} entries",
                    element.attr("r").unwrap_or("?"),
                    index,
                    SHARED_STRINGS_PART,
                    shared.len()
                ))
            })?
        }
        _ => element.child("v").map(Element::text).unwrap_or_default(),
    };

    Ok(vec![ContentItem::text(value)])
}

fn handle_chart_value<'a>(element: &'a Element, _walker: &mut Walker<'a, ()>) -> Result<Vec<ContentItem>> {
    Ok(vec![ContentItem::text(element.text())])
}

static CHART_TABLE: Lazy<DispatchTable<()>> = Lazy::new(|| {
    DispatchTable::new()
        .handle("c:v", handle_chart_value)
        .without_loose_text()
});

/// Cached values of a chart part (`c:v`), joined with newlines.
pub fn walk_chart(root: &Element, max_depth: usize) -> Result<String> {
    let items = Walker::new(&*CHART_TABLE, (), max_depth).walk(root)?;
    Ok(join_non_empty(&items))
}

fn join_non_empty(items: &[ContentItem]) -> String {
    items
        .iter()
        .map(|item| item.content.trim())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walked workbook: one item per part in archive order (text for sheets,
/// drawings and charts; `Image` items naming a media path) plus media bytes.
#[derive(Debug, Default)]
pub struct XlsxContent {
    pub items: Vec<ContentItem>,
    pub media: HashMap<String, Vec<u8>>,
}

impl XlsxContent {
    pub fn image_refs(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.kind == ContentKind::Image)
            .map(|item| item.content.as_str())
            .collect()
    }

    /// Final text; `descriptions` holds one entry per image item, in order.
    /// Empty contributions are dropped.
    pub fn render(&self, descriptions: &[String]) -> String {
        let mut descriptions = descriptions.iter();
        self.items
            .iter()
            .filter_map(|item| match item.kind {
                ContentKind::Image => descriptions.next().map(String::as_str),
                _ => Some(item.content.as_str()),
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walk every selected workbook part.
///
/// # Errors
///
/// - `CorruptedDocument` when no worksheet is present, or a cell points past
///   the end of the shared-string table
/// - `MalformedDocument` for unparseable markup
pub fn walk_workbook(parts: Vec<ArchivePart>, max_depth: usize) -> Result<XlsxContent> {
    if !parts.iter().any(|part| SHEET_PART.is_match(&part.path)) {
        return Err(AnyExtractError::corrupted_document(
            "Spreadsheet contains no worksheet (xl/worksheets/sheetN.xml)",
        ));
    }

    let shared_strings = match parts.iter().find(|part| part.path == SHARED_STRINGS_PART) {
        Some(part) => parse_shared_strings(&part.content, max_depth)?,
        None => Vec::new(),
    };
    tracing::debug!(shared_strings = shared_strings.len(), parts = parts.len(), "walking workbook");

    let mut content = XlsxContent::default();
    let mut parsed = Vec::with_capacity(parts.len());
    for part in parts {
        let kind = if SHEET_PART.is_match(&part.path) {
            WorkbookPart::Sheet(parse_markup(&part.content, max_depth)?)
        } else if DRAWING_PART.is_match(&part.path) {
            WorkbookPart::Drawing(parse_markup(&part.content, max_depth)?)
        } else if CHART_PART.is_match(&part.path) {
            WorkbookPart::Chart(parse_markup(&part.content, max_depth)?)
        } else if IMAGE_PART.is_match(&part.path) {
            content.media.insert(part.path.clone(), part.content);
            WorkbookPart::Image(part.path)
        } else {
            continue;
        };
        parsed.push(kind);
    }

    let mut sheets = Walker::new(&*SHEET_TABLE, shared_strings, max_depth);
    for part in &parsed {
        match part {
            WorkbookPart::Sheet(root) => {
                let cells = sheets.walk(root)?;
                content.items.push(ContentItem::text(join_non_empty(&cells)));
            }
            WorkbookPart::Drawing(root) => content.items.push(ContentItem::text(drawing_text(root, max_depth)?)),
            WorkbookPart::Chart(root) => content.items.push(ContentItem::text(walk_chart(root, max_depth)?)),
            WorkbookPart::Image(path) => content.items.push(ContentItem::image(path.clone())),
        }
    }

    Ok(content)
}

enum WorkbookPart {
    Sheet(Element),
    Drawing(Element),
    Chart(Element),
    Image(String),
}
