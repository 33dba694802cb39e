use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relationship ID to bare media filename, e.g. `rId7 -> image1.png`.
///
/// Built once per extraction from a `*.rels` manifest and read-only afterwards.
pub type RelationshipMap = HashMap<String, String>;

/// One named entry materialized from a container archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePart {
    pub path: String,
    pub content: Vec<u8>,
}

impl ArchivePart {
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

/// Callout flavours of the wiki storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalloutKind {
    Note,
    Warning,
    Tip,
    Info,
    Panel,
    Expand,
    Status,
}

impl CalloutKind {
    /// Map a `ac:structured-macro` name to a callout flavour.
    pub fn from_macro_name(name: &str) -> Option<Self> {
        match name {
            "note" => Some(Self::Note),
            "warning" => Some(Self::Warning),
            "tip" => Some(Self::Tip),
            "info" => Some(Self::Info),
            "panel" => Some(Self::Panel),
            "expand" => Some(Self::Expand),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Kind tag of a [`ContentItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "callout", rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Heading,
    Paragraph,
    Table,
    Code,
    Callout(CalloutKind),
    Task,
    Image,
    Attachment,
    Link,
    AdfExtension,
}

impl ContentKind {
    /// Image and attachment items carry an unresolved reference until the
    /// owning adapter resolves them.
    pub fn is_reference(&self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::Attachment)
    }
}

/// One ordered, typed unit of extracted text.
///
/// The sequence of items produced by a walk matches the visual order of the
/// source document, including nested constructs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub content: String,
}

impl ContentItem {
    pub fn new(kind: ContentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ContentKind::Text, content)
    }

    pub fn image(reference: impl Into<String>) -> Self {
        Self::new(ContentKind::Image, reference)
    }

    pub fn attachment(reference: impl Into<String>) -> Self {
        Self::new(ContentKind::Attachment, reference)
    }
}

/// Join item contents in order with `separator`.
pub fn join_contents(items: &[ContentItem], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.content.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
