//! Confluence storage format walking.
//!
//! Storage format is XHTML extended with `ac:` (macros, layouts, tasks) and
//! `ri:` (resource identifiers) elements. The walk starts at the page's first
//! `ac:layout` when there is one, so page-level metadata outside the layout is
//! skipped; pages without layouts are walked from the root.
//!
//! Container constructs (callouts, task bodies, link text) re-enter the walker
//! and concatenate the nested items in visit order.

use crate::error::Result;
use crate::extraction::markup::{Element, parse_markup};
use crate::extraction::walker::{DispatchTable, Walker};
use crate::types::{CalloutKind, ContentItem, ContentKind};
use once_cell::sync::Lazy;

/// Download URL prefix for the attachments of one page, e.g.
/// `https://acme.atlassian.net/wiki/download/attachments/12345`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLinks {
    prefix: String,
}

impl AttachmentLinks {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Download URL for `filename`, percent-encoded.
    pub fn url(&self, filename: &str) -> String {
        format!("{}/{}", self.prefix, urlencoding::encode(filename))
    }
}

static STORAGE_TABLE: Lazy<DispatchTable<AttachmentLinks>> = Lazy::new(|| {
    DispatchTable::new()
        .handle("ac:structured-macro", handle_macro)
        .handle("ac:adf-extension", handle_adf_extension)
        .handle("ac:task-list", handle_task_list)
        .handle("ac:image", handle_image)
        .handle("table", handle_table)
        .handle("a", handle_link)
});

fn concat(items: &[ContentItem]) -> String {
    items.iter().map(|item| item.content.as_str()).collect()
}

fn handle_macro<'a>(element: &'a Element, walker: &mut Walker<'a, AttachmentLinks>) -> Result<Vec<ContentItem>> {
    let name = element.attr("ac:name").unwrap_or_default();

    if let Some(kind) = CalloutKind::from_macro_name(name) {
        let nested = match kind {
            CalloutKind::Panel => walker.walk_children_ignoring(element, &["ac:parameter"])?,
            _ => walker.walk_children(element)?,
        };
        return Ok(vec![ContentItem::new(ContentKind::Callout(kind), concat(&nested))]);
    }

    match name {
        "code" => {
            let code = element
                .find("ac:plain-text-body")
                .map(|body| body.text().trim().to_string())
                .unwrap_or_default();
            Ok(vec![ContentItem::new(ContentKind::Code, code)])
        }
        "view-file" => {
            let filename = element
                .find_all("ac:parameter")
                .into_iter()
                .filter(|param| param.attr("ac:name") == Some("name"))
                .find_map(|param| param.find("ri:attachment"))
                .and_then(|attachment| attachment.attr("ri:filename"))
                .map(str::trim)
                .filter(|filename| !filename.is_empty());
            let url = filename.map(|f| walker.context().url(f)).unwrap_or_default();
            Ok(vec![ContentItem::attachment(url)])
        }
        other => {
            tracing::debug!(macro_name = other, "unsupported storage macro, skipping");
            Ok(Vec::new())
        }
    }
}

fn handle_adf_extension<'a>(
    element: &'a Element,
    _walker: &mut Walker<'a, AttachmentLinks>,
) -> Result<Vec<ContentItem>> {
    let content = element
        .find("ac:adf-node")
        .and_then(|node| node.find("ac:adf-content"))
        .map(|content| content.text().trim().to_string())
        .unwrap_or_default();
    Ok(vec![ContentItem::new(ContentKind::AdfExtension, content)])
}

fn handle_task_list<'a>(element: &'a Element, walker: &mut Walker<'a, AttachmentLinks>) -> Result<Vec<ContentItem>> {
    let mut tasks = Vec::new();
    for task in element.find_all("ac:task") {
        let status = task
            .find("ac:task-status")
            .map(|status| status.text().trim().to_string())
            .unwrap_or_default();
        let body = match task.find("ac:task-body") {
            Some(body) => concat(&walker.walk_children(body)?),
            None => String::new(),
        };
        tasks.push(ContentItem::new(
            ContentKind::Task,
            format!("{} [Status: {}]", body, status),
        ));
    }
    Ok(tasks)
}

fn handle_image<'a>(element: &'a Element, walker: &mut Walker<'a, AttachmentLinks>) -> Result<Vec<ContentItem>> {
    let filename = element
        .find("ri:attachment")
        .and_then(|attachment| attachment.attr("ri:filename"))
        .map(str::trim)
        .filter(|filename| !filename.is_empty());

    Ok(match filename {
        Some(filename) => vec![ContentItem::image(walker.context().url(filename))],
        None => Vec::new(),
    })
}

fn handle_table<'a>(element: &'a Element, _walker: &mut Walker<'a, AttachmentLinks>) -> Result<Vec<ContentItem>> {
    let rows: Vec<String> = element
        .find_all("tr")
        .into_iter()
        .map(|row| {
            row.elements()
                .filter(|cell| cell.name == "th" || cell.name == "td")
                .map(|cell| cell.text().trim().to_string())
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect();
    Ok(vec![ContentItem::new(ContentKind::Table, rows.join("\n"))])
}

fn handle_link<'a>(element: &'a Element, walker: &mut Walker<'a, AttachmentLinks>) -> Result<Vec<ContentItem>> {
    let href = element.attr("href").unwrap_or_default();
    let text = concat(&walker.walk_children(element)?);
    Ok(vec![ContentItem::new(ContentKind::Link, format!("{} ({})", text, href))])
}

/// Ordered items of a storage-format page. Image and attachment items carry
/// download URLs built from `links`.
///
/// # Errors
///
/// `MalformedDocument` when the markup cannot be tokenized or nests deeper
/// than `max_depth`.
pub fn storage_items(xml: &str, links: AttachmentLinks, max_depth: usize) -> Result<Vec<ContentItem>> {
    let root = parse_markup(xml.as_bytes(), max_depth)?;
    let start = root.find("ac:layout").unwrap_or(&root);

    let mut walker = Walker::new(&*STORAGE_TABLE, links, max_depth);
    walker.walk_children(start)
}
