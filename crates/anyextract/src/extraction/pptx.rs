//! PresentationML (PPTX) slide walking.
//!
//! Slides are ordered by the number in their file name (`slide2.xml` before
//! `slide10.xml`). For every slide the output holds, in order: the slide's
//! paragraph text, one `Image` item per image relationship of the slide whose
//! media part is present, and the text of the slide's notes. Notes are found
//! through the slide's `notesSlide` relationship; a slide without relationships
//! falls back to the notes part carrying the same number.

use crate::error::{AnyExtractError, Result};
use crate::extraction::drawingml::drawing_text;
use crate::extraction::markup::{Element, parse_markup};
use crate::extraction::relationships::{image_targets, notes_slide_target};
use crate::types::{ArchivePart, ContentItem, ContentKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

static SLIDE_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("valid regex"));
static NOTES_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/notesSlides/notesSlide(\d+)\.xml$").expect("valid regex"));
static SLIDE_RELS_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/_rels/slide(\d+)\.xml\.rels$").expect("valid regex"));
const MEDIA_PREFIX: &str = "ppt/media/";
const SLIDES_DIR: &str = "ppt/slides";
const NOTES_DIR: &str = "ppt/notesSlides";

/// Archive paths the Slide adapter needs. Media parts are only selected when
/// images will be described.
pub fn is_pptx_part(path: &str, with_media: bool) -> bool {
    SLIDE_PART.is_match(path)
        || NOTES_PART.is_match(path)
        || SLIDE_RELS_PART.is_match(path)
        || (with_media && path.starts_with(MEDIA_PREFIX))
}

fn slide_number(regex: &Regex, path: &str) -> Option<u32> {
    regex.captures(path)?.get(1)?.as_str().parse().ok()
}

/// Resolve a relationship target relative to `base_dir`, e.g.
/// `../media/image1.png` from `ppt/slides` gives `ppt/media/image1.png`.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[derive(Default)]
struct SlideParts {
    slide: Option<Vec<u8>>,
    rels: Option<Vec<u8>>,
}

/// Walked presentation: per-slide items in slide order plus media bytes.
#[derive(Debug, Default)]
pub struct PptxContent {
    pub items: Vec<ContentItem>,
    pub media: HashMap<String, Vec<u8>>,
}

impl PptxContent {
    pub fn image_refs(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.kind == ContentKind::Image)
            .map(|item| item.content.as_str())
            .collect()
    }

    /// Final text. Images with a non-empty description render as
    /// `[Image]: <description>`; empty contributions are dropped.
    pub fn render(&self, descriptions: &[String]) -> String {
        let mut descriptions = descriptions.iter();
        let mut lines = Vec::new();
        for item in &self.items {
            match item.kind {
                ContentKind::Image => {
                    if let Some(description) = descriptions.next()
                        && !description.is_empty()
                    {
                        lines.push(format!("[Image]: {}", description));
                    }
                }
                _ if !item.content.is_empty() => lines.push(item.content.clone()),
                _ => {}
            }
        }
        lines.join("\n")
    }
}

/// Walk every slide.
///
/// # Errors
///
/// `CorruptedDocument` when the package holds no slide; `MalformedDocument`
/// for unparseable markup.
pub fn walk_presentation(parts: Vec<ArchivePart>, max_depth: usize) -> Result<PptxContent> {
    let mut slides: BTreeMap<u32, SlideParts> = BTreeMap::new();
    let mut notes_parts: HashMap<String, Vec<u8>> = HashMap::new();
    let mut content = PptxContent::default();

    for part in parts {
        if let Some(n) = slide_number(&SLIDE_PART, &part.path) {
            slides.entry(n).or_default().slide = Some(part.content);
        } else if NOTES_PART.is_match(&part.path) {
            notes_parts.insert(part.path, part.content);
        } else if let Some(n) = slide_number(&SLIDE_RELS_PART, &part.path) {
            slides.entry(n).or_default().rels = Some(part.content);
        } else if part.path.starts_with(MEDIA_PREFIX) {
            content.media.insert(part.path, part.content);
        }
    }

    if !slides.values().any(|parts| parts.slide.is_some()) {
        return Err(AnyExtractError::corrupted_document(
            "Presentation contains no slide (ppt/slides/slideN.xml)",
        ));
    }

    for (number, parts) in &slides {
        let Some(slide) = &parts.slide else {
            tracing::debug!(slide = number, "relationships without a slide, skipping");
            continue;
        };

        let root: Element = parse_markup(slide, max_depth)?;
        content.items.push(ContentItem::text(drawing_text(&root, max_depth)?));

        if let Some(rels) = &parts.rels {
            for target in image_targets(rels)? {
                let path = resolve_target(SLIDES_DIR, &target);
                if content.media.contains_key(&path) {
                    content.items.push(ContentItem::image(path));
                }
            }
        }

        let notes_path = match &parts.rels {
            Some(rels) => notes_slide_target(rels)?.map(|target| resolve_target(SLIDES_DIR, &target)),
            None => Some(format!("{}/notesSlide{}.xml", NOTES_DIR, number)),
        };
        if let Some(notes) = notes_path.and_then(|path| notes_parts.get(&path)) {
            let root = parse_markup(notes, max_depth)?;
            content.items.push(ContentItem::text(drawing_text(&root, max_depth)?));
        }
    }

    tracing::debug!(slides = slides.len(), images = content.image_refs().len(), "walked presentation");
    Ok(content)
}
