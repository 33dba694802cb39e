//! OpenDocument adapter for text, spreadsheet, presentation, graphics and
//! formula packages.

use crate::Result;
use crate::core::mime::ODF_MIME_TYPES;
use crate::extraction::archive::{ArchiveSource, read_selected_parts};
use crate::extraction::odf::{is_odf_part, walk_odf};
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use async_trait::async_trait;
use std::path::Path;

pub struct OdfAdapter;

impl OdfAdapter {
    pub fn new() -> Self {
        Self
    }

    fn extract_from(&self, source: ArchiveSource<'_>, ctx: &AdapterContext<'_>) -> Result<String> {
        let limits = &ctx.config.limits;
        let parts = read_selected_parts(source, limits.max_part_bytes, is_odf_part)?;
        Ok(walk_odf(parts, limits.max_depth)?.render())
    }
}

impl Default for OdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OdfAdapter {
    fn name(&self) -> &str {
        "odf-adapter"
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
        "Paragraph text and speaker notes of OpenDocument packages"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for OdfAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        ODF_MIME_TYPES
    }

    #[tracing::instrument(skip(self, content, ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Bytes(content), ctx)
    }

    async fn extract_file(&self, path: &Path, ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Path(path), ctx)
    }
}
