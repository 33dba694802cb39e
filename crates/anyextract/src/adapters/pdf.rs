//! PDF adapter: page text in page order, via `lopdf`.

use crate::core::mime::PDF_MIME_TYPE;
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use crate::{AnyExtractError, Result};
use async_trait::async_trait;

pub struct PdfAdapter;

impl PdfAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PdfAdapter {
    fn name(&self) -> &str {
        "pdf-adapter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Extracts the text layer of PDF documents"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

/// Text of every page, trimmed, one page per line block.
fn pdf_text(content: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(content)
        .map_err(|e| AnyExtractError::corrupted_document_with_source("Failed to load PDF document", e))?;

    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    pages.push(text.to_string());
                }
            }
            Err(e) => tracing::warn!(page = page_number, error = %e, "failed to extract PDF page text, skipping"),
        }
    }

    tracing::debug!(pages = pages.len(), "extracted PDF text");
    Ok(pages.join("\n"))
}

#[async_trait]
impl DocumentAdapter for PdfAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        &[PDF_MIME_TYPE]
    }

    #[tracing::instrument(skip(self, content, _ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], _ctx: &AdapterContext<'_>) -> Result<String> {
        pdf_text(content)
    }
}
