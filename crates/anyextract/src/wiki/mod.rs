//! Confluence page extraction.
//!
//! [`ConfluenceClient`] fetches a page's storage-format body; [`storage_items`]
//! walks it into ordered items whose image and attachment references are
//! download URLs. Turning those references into text (image descriptions,
//! attachment extraction) is left to [`Engine::parse_wiki_page`](crate::Engine::parse_wiki_page).

pub mod client;
pub mod storage;

pub use client::ConfluenceClient;
pub use storage::{AttachmentLinks, storage_items};

use crate::Result;
use crate::types::ContentItem;

/// Fetch `page_id` and walk its storage body.
pub async fn fetch_page_items(client: &ConfluenceClient, page_id: &str, max_depth: usize) -> Result<Vec<ContentItem>> {
    let xml = client.fetch_storage(page_id).await?;
    storage_items(&xml, client.attachment_links(page_id), max_depth)
}
