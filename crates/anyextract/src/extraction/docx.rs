//! WordprocessingML (DOCX) body walking.
//!
//! A Word package is read in three steps:
//!
//! 1. [`DocxPackage::from_parts`] sorts the selected archive parts into the main
//!    body, optional footnotes and endnotes, the relationship manifest and the
//!    media directory, rejecting packages without a body or manifest.
//! 2. [`DocxPackage::walk`] runs the Word dispatch table over each section.
//!    Paragraphs and tables become items; every inline drawing whose
//!    relationship ID resolves to a media part becomes an `Image` item naming
//!    that part, right after the paragraph that holds it.
//! 3. [`DocxSections::render`] stitches the sections back together once the caller
//!    has described the images, inserting `[Image: ...]` placeholders in place.

use crate::error::{AnyExtractError, Result};
use crate::extraction::markup::{Element, MarkupNode, parse_markup};
use crate::extraction::relationships::resolve_relationships;
use crate::extraction::walker::{DispatchTable, Walker};
use crate::types::{ArchivePart, ContentItem, ContentKind, RelationshipMap};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static MAIN_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^word/document\d*\.xml$").expect("valid regex"));
static FOOTNOTES_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^word/footnotes\d*\.xml$").expect("valid regex"));
static ENDNOTES_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^word/endnotes\d*\.xml$").expect("valid regex"));
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";
const MEDIA_PREFIX: &str = "word/media/";

pub const FOOTNOTES_SEPARATOR: &str = "\n--- Footnotes ---\n";
pub const ENDNOTES_SEPARATOR: &str = "\n--- Endnotes ---\n";

/// Archive paths the Word adapter needs. Media parts are only selected when
/// images will be described.
pub fn is_docx_part(path: &str, with_media: bool) -> bool {
    MAIN_PART.is_match(path)
        || FOOTNOTES_PART.is_match(path)
        || ENDNOTES_PART.is_match(path)
        || path == RELATIONSHIPS_PART
        || (with_media && path.starts_with(MEDIA_PREFIX))
}

/// Walk context: what an `r:embed` ID can resolve to.
#[derive(Debug, Default)]
pub struct WordBody {
    relationships: RelationshipMap,
    media: HashMap<String, Vec<u8>>,
}

impl WordBody {
    fn resolve_embed(&self, id: &str) -> Option<&str> {
        self.relationships
            .get(id)
            .map(String::as_str)
            .filter(|filename| self.media.contains_key(*filename))
    }
}

static WORD_TABLE: Lazy<DispatchTable<WordBody>> = Lazy::new(|| {
    DispatchTable::new()
        .handle("w:p", handle_paragraph)
        .handle("w:tbl", handle_table)
        .ignore("w:sectPr")
        .without_loose_text()
});

fn handle_paragraph<'a>(element: &'a Element, walker: &mut Walker<'a, WordBody>) -> Result<Vec<ContentItem>> {
    let mut runs = RunCollector::default();
    runs.collect(element, walker.context());

    let mut items = vec![ContentItem::new(ContentKind::Paragraph, runs.text)];
    items.extend(runs.images.into_iter().map(ContentItem::image));
    Ok(items)
}

fn handle_table<'a>(element: &'a Element, walker: &mut Walker<'a, WordBody>) -> Result<Vec<ContentItem>> {
    let mut images = Vec::new();
    let rows: Vec<String> = element
        .find_all("w:tr")
        .into_iter()
        .map(|row| {
            row.find_all("w:tc")
                .into_iter()
                .map(|cell| {
                    let mut runs = RunCollector::default();
                    for paragraph in cell.find_all("w:p") {
                        if !runs.text.is_empty() {
                            runs.text.push(' ');
                        }
                        runs.collect(paragraph, walker.context());
                    }
                    images.append(&mut runs.images);
                    runs.text.trim().to_string()
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect();

    let mut items = vec![ContentItem::new(ContentKind::Table, rows.join("\n"))];
    items.extend(images.into_iter().map(ContentItem::image));
    Ok(items)
}

/// Text runs and resolved image references of one paragraph.
#[derive(Debug, Default)]
struct RunCollector {
    text: String,
    images: Vec<String>,
}

impl RunCollector {
    fn collect(&mut self, element: &Element, body: &WordBody) {
        for child in &element.children {
            let MarkupNode::Element(child) = child else {
                continue;
            };
            match child.name.as_str() {
                "w:t" => self.text.push_str(&child.text()),
                "w:tab" => self.text.push('\t'),
                "w:br" | "w:cr" => self.text.push('\n'),
                // Properties hold tab stops and other markup that is not content;
                // fallbacks repeat the drawing of their `mc:Choice` sibling.
                "w:pPr" | "w:rPr" | "mc:Fallback" => {}
                "w:drawing" => {
                    if let Some(embed) = child.find("a:blip").and_then(|blip| blip.attr("r:embed")) {
                        self.push_image(embed, body);
                    }
                    self.collect(child, body);
                }
                "v:imagedata" => {
                    if let Some(id) = child.attr("r:id") {
                        self.push_image(id, body);
                    }
                }
                _ => self.collect(child, body),
            }
        }
    }

    fn push_image(&mut self, id: &str, body: &WordBody) {
        if let Some(filename) = body.resolve_embed(id) {
            self.images.push(filename.to_string());
        }
    }
}

/// Parsed parts of one Word package.
#[derive(Debug)]
pub struct DocxPackage {
    main: Element,
    footnotes: Option<Element>,
    endnotes: Option<Element>,
    body: WordBody,
}

impl DocxPackage {
    /// Sort selected parts and parse the sections.
    ///
    /// # Errors
    ///
    /// `CorruptedDocument` when the main body or the relationship manifest is
    /// missing; `MalformedDocument` for unparseable markup.
    pub fn from_parts(parts: Vec<ArchivePart>, max_depth: usize) -> Result<Self> {
        let mut main = None;
        let mut footnotes = None;
        let mut endnotes = None;
        let mut manifest = None;
        let mut media = HashMap::new();

        for part in parts {
            if MAIN_PART.is_match(&part.path) {
                main.get_or_insert(part.content);
            } else if FOOTNOTES_PART.is_match(&part.path) {
                footnotes.get_or_insert(part.content);
            } else if ENDNOTES_PART.is_match(&part.path) {
                endnotes.get_or_insert(part.content);
            } else if part.path == RELATIONSHIPS_PART {
                manifest = Some(part.content);
            } else if let Some(filename) = part.path.strip_prefix(MEDIA_PREFIX) {
                media.insert(filename.to_string(), part.content);
            }
        }

        let Some(main) = main else {
            return Err(AnyExtractError::corrupted_document(
                "Word document is missing its main part (word/document.xml)",
            ));
        };
        let Some(manifest) = manifest else {
            return Err(AnyExtractError::corrupted_document(format!(
                "Word document is missing its relationship manifest ({})",
                RELATIONSHIPS_PART
            )));
        };

        let relationships = resolve_relationships(&manifest)?;
        tracing::debug!(
            relationships = relationships.len(),
            media = media.len(),
            footnotes = footnotes.is_some(),
            endnotes = endnotes.is_some(),
            "parsed word package"
        );

        Ok(Self {
            main: parse_markup(&main, max_depth)?,
            footnotes: footnotes.map(|xml| parse_markup(&xml, max_depth)).transpose()?,
            endnotes: endnotes.map(|xml| parse_markup(&xml, max_depth)).transpose()?,
            body: WordBody { relationships, media },
        })
    }

    /// Walk every section. Media bytes are handed back with the result so the
    /// caller can describe image items.
    pub fn walk(self, max_depth: usize) -> Result<DocxSections> {
        let DocxPackage {
            main,
            footnotes,
            endnotes,
            body,
        } = self;

        let mut walker = Walker::new(&*WORD_TABLE, body, max_depth);
        let main = walker.walk(&main)?;
        let footnotes = match &footnotes {
            Some(root) => Some(walker.walk(root)?),
            None => None,
        };
        let endnotes = match &endnotes {
            Some(root) => Some(walker.walk(root)?),
            None => None,
        };

        Ok(DocxSections {
            main,
            footnotes,
            endnotes,
            media: walker.into_context().media,
        })
    }
}

/// Walked sections of one Word package, plus its media parts.
#[derive(Debug, Default)]
pub struct DocxSections {
    pub main: Vec<ContentItem>,
    pub footnotes: Option<Vec<ContentItem>>,
    pub endnotes: Option<Vec<ContentItem>>,
    pub media: HashMap<String, Vec<u8>>,
}

impl DocxSections {
    /// Media filenames of every image item, in output order across sections.
    pub fn image_refs(&self) -> Vec<&str> {
        self.main
            .iter()
            .chain(self.footnotes.iter().flatten())
            .chain(self.endnotes.iter().flatten())
            .filter(|item| item.kind == ContentKind::Image)
            .map(|item| item.content.as_str())
            .collect()
    }

    /// Final text. `descriptions` holds one entry per [`image_refs`](Self::image_refs)
    /// entry, in the same order; `None` leaves images out entirely.
    pub fn render(&self, descriptions: Option<&[String]>) -> String {
        let mut descriptions = descriptions.map(|d| d.iter());
        let mut render = |items: &[ContentItem]| render_blocks(items, descriptions.as_mut());

        let main = render(&self.main);
        let footnotes = self.footnotes.as_deref().map(&mut render).unwrap_or_default();
        let endnotes = self.endnotes.as_deref().map(&mut render).unwrap_or_default();

        let mut sections = vec![main];
        if !footnotes.is_empty() {
            sections.push(format!("{}{}", FOOTNOTES_SEPARATOR, footnotes));
        }
        if !endnotes.is_empty() {
            sections.push(format!("{}{}", ENDNOTES_SEPARATOR, endnotes));
        }
        sections.join("\n")
    }
}

/// Group items into paragraph blocks: every paragraph or table opens a block,
/// images append `\n[Image: ...]` to the block they follow.
fn render_blocks<'d>(items: &[ContentItem], mut descriptions: Option<&mut std::slice::Iter<'d, String>>) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for item in items {
        match item.kind {
            ContentKind::Image => {
                // Each image consumes its description even when it is empty.
                let Some(iter) = descriptions.as_deref_mut() else {
                    continue;
                };
                let description = iter.next().map(String::as_str).unwrap_or_default();
                if blocks.is_empty() {
                    blocks.push(String::new());
                }
                if let Some(block) = blocks.last_mut() {
                    block.push_str("\n[Image: ");
                    block.push_str(description);
                    block.push(']');
                }
            }
            _ => blocks.push(item.content.clone()),
        }
    }

    blocks
        .iter()
        .map(|block| block.trim())
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
