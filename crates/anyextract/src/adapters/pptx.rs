//! Presentation (.pptx) adapter.
//!
//! Slides in numeric order; each slide's text is followed by its picture
//! descriptions (`[Image]: ...`) and then its speaker notes.

use crate::Result;
use crate::adapters::describe_images;
use crate::core::mime::POWER_POINT_MIME_TYPE;
use crate::extraction::archive::{ArchiveSource, read_selected_parts};
use crate::extraction::pptx::{is_pptx_part, walk_presentation};
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use async_trait::async_trait;
use std::path::Path;

pub struct PptxAdapter;

impl PptxAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn extract_from(&self, source: ArchiveSource<'_>, ctx: &AdapterContext<'_>) -> Result<String> {
        let limits = &ctx.config.limits;
        let with_media = ctx.options.extract_images;
        let parts = read_selected_parts(source, limits.max_part_bytes, |path| is_pptx_part(path, with_media))?;
        let presentation = walk_presentation(parts, limits.max_depth)?;

        let descriptions = describe_images(&presentation.image_refs(), &presentation.media, ctx).await;
        Ok(presentation.render(&descriptions))
    }
}

impl Default for PptxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PptxAdapter {
    fn name(&self) -> &str {
        "pptx-adapter"
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
        "Slide text, speaker notes and image descriptions of PowerPoint presentations"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for PptxAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        &[POWER_POINT_MIME_TYPE]
    }

    #[tracing::instrument(skip(self, content, ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Bytes(content), ctx).await
    }

    async fn extract_file(&self, path: &Path, ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Path(path), ctx).await
    }
}
