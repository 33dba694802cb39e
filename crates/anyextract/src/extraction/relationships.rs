//! Relationship manifest (`*.rels`) resolution.
//!
//! Office Open XML parts refer to each other through short IDs declared in a
//! sibling `_rels/<part>.rels` manifest:
//!
//! ```xml
//! <Relationships>
//!   <Relationship Id="rId7" Type=".../image" Target="media/image1.png"/>
//! </Relationships>
//! ```

use crate::error::{AnyExtractError, Result};
use crate::types::RelationshipMap;
use roxmltree::Document;

fn manifest_str(manifest: &[u8]) -> Result<&str> {
    std::str::from_utf8(manifest)
        .map_err(|e| AnyExtractError::malformed_document(format!("Invalid UTF-8 in relationship manifest: {}", e)))
}

/// Map relationship IDs to bare media filenames.
///
/// Only targets under a `media/` directory are kept (`media/x.png`,
/// `../media/x.png`); hyperlinks, styles and other relationships are dropped.
pub fn resolve_relationships(manifest: &[u8]) -> Result<RelationshipMap> {
    let xml = manifest_str(manifest)?;
    let doc = Document::parse(xml)
        .map_err(|e| AnyExtractError::malformed_document(format!("Failed to parse relationship manifest: {}", e)))?;

    let mut map = RelationshipMap::new();
    for node in doc.descendants() {
        if node.has_tag_name("Relationship")
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
            && let Some(filename) = media_filename(target)
        {
            map.insert(id.to_string(), filename.to_string());
        }
    }

    Ok(map)
}

/// Targets of image relationships, in manifest order.
///
/// Used for slides, whose images are resolved from the manifest rather than
/// from inline references.
pub fn image_targets(manifest: &[u8]) -> Result<Vec<String>> {
    targets_where(manifest, |kind| kind.contains("/image"))
}

/// Target of the slide's `notesSlide` relationship, if it declares one.
pub fn notes_slide_target(manifest: &[u8]) -> Result<Option<String>> {
    Ok(targets_where(manifest, |kind| kind.ends_with("/notesSlide"))?
        .into_iter()
        .next())
}

fn targets_where(manifest: &[u8], mut matches_type: impl FnMut(&str) -> bool) -> Result<Vec<String>> {
    let xml = manifest_str(manifest)?;
    let doc = Document::parse(xml)
        .map_err(|e| AnyExtractError::malformed_document(format!("Failed to parse relationship manifest: {}", e)))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("Relationship"))
        .filter(|node| node.attribute("Type").is_some_and(|kind| matches_type(kind)))
        .filter_map(|node| node.attribute("Target").map(str::to_string))
        .collect())
}

fn media_filename(target: &str) -> Option<&str> {
    if target.contains("://") {
        return None;
    }
    let relative = target.trim_start_matches("../").trim_start_matches('/');
    let filename = relative
        .strip_prefix("media/")
        .or_else(|| relative.split_once("/media/").map(|(_, rest)| rest))?;
    if filename.is_empty() || filename.contains('/') {
        return None;
    }
    Some(filename)
}
