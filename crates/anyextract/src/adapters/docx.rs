//! Word (.docx) adapter.
//!
//! Output is the body text, then footnotes and endnotes behind their section
//! separators. With image extraction enabled, every inline picture becomes an
//! `[Image: ...]` line right after the paragraph holding it.

use crate::Result;
use crate::adapters::describe_images;
use crate::core::mime::DOCX_MIME_TYPE;
use crate::extraction::archive::{ArchiveSource, read_selected_parts};
use crate::extraction::docx::{DocxPackage, is_docx_part};
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use async_trait::async_trait;
use std::path::Path;

pub struct DocxAdapter;

impl DocxAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn extract_from(&self, source: ArchiveSource<'_>, ctx: &AdapterContext<'_>) -> Result<String> {
        let limits = &ctx.config.limits;
        let with_media = ctx.options.extract_images;
        let parts = read_selected_parts(source, limits.max_part_bytes, |path| is_docx_part(path, with_media))?;
        let sections = DocxPackage::from_parts(parts, limits.max_depth)?.walk(limits.max_depth)?;

        if !with_media {
            return Ok(sections.render(None));
        }
        let descriptions = describe_images(&sections.image_refs(), &sections.media, ctx).await;
        Ok(sections.render(Some(&descriptions)))
    }
}

impl Default for DocxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DocxAdapter {
    fn name(&self) -> &str {
        "docx-adapter"
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
        "Ordered text of Word documents with footnotes, endnotes and inline image descriptions"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for DocxAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        &[DOCX_MIME_TYPE]
    }

    #[tracing::instrument(skip(self, content, ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Bytes(content), ctx).await
    }

    async fn extract_file(&self, path: &Path, ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Path(path), ctx).await
    }
}
