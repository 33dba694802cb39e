//! Spreadsheet (.xlsx) adapter.
//!
//! Worksheet cells, drawing text, chart values and (with image extraction)
//! embedded picture descriptions, one per line in archive order.

use crate::Result;
use crate::adapters::describe_images;
use crate::core::mime::EXCEL_MIME_TYPE;
use crate::extraction::archive::{ArchiveSource, read_selected_parts};
use crate::extraction::excel::{is_xlsx_part, walk_workbook};
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use async_trait::async_trait;
use std::path::Path;

pub struct XlsxAdapter;

impl XlsxAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn extract_from(&self, source: ArchiveSource<'_>, ctx: &AdapterContext<'_>) -> Result<String> {
        let limits = &ctx.config.limits;
        let with_media = ctx.options.extract_images;
        let parts = read_selected_parts(source, limits.max_part_bytes, |path| is_xlsx_part(path, with_media))?;
        let workbook = walk_workbook(parts, limits.max_depth)?;

        let descriptions = describe_images(&workbook.image_refs(), &workbook.media, ctx).await;
        Ok(workbook.render(&descriptions))
    }
}

impl Default for XlsxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for XlsxAdapter {
    fn name(&self) -> &str {
        "xlsx-adapter"
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
        "Cell values, drawing text, chart values and image descriptions of Excel workbooks"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for XlsxAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        &[EXCEL_MIME_TYPE]
    }

    #[tracing::instrument(skip(self, content, ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Bytes(content), ctx).await
    }

    async fn extract_file(&self, path: &Path, ctx: &AdapterContext<'_>) -> Result<String> {
        self.extract_from(ArchiveSource::Path(path), ctx).await
    }
}
