//! Format adapter plugin trait.
//!
//! An adapter turns the bytes of one family of formats into ordered plain text.
//! Adapters that embed images (Word, Sheet, Slide) hand image bytes to the
//! [`ImageDescriber`] in their [`AdapterContext`]; the engine implements it by
//! routing the bytes back through its own registry.

use crate::Result;
use crate::core::config::{ExtractionOptions, ExtractorConfig};
use crate::plugins::Plugin;
use async_trait::async_trait;
use std::path::Path;

/// Describes embedded images as text.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    /// Text for one image. Implementations return an empty string for media
    /// they cannot handle.
    async fn describe_image(&self, image: &[u8], options: &ExtractionOptions) -> Result<String>;
}

/// Describer used when no engine is around, e.g. when an adapter is driven
/// directly. Every image contributes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

#[async_trait]
impl ImageDescriber for NoImages {
    async fn describe_image(&self, _image: &[u8], _options: &ExtractionOptions) -> Result<String> {
        Ok(String::new())
    }
}

/// Everything an adapter may consult besides the document bytes.
#[derive(Clone, Copy)]
pub struct AdapterContext<'a> {
    /// MIME type the engine routed on.
    pub mime_type: &'a str,
    pub options: &'a ExtractionOptions,
    pub config: &'a ExtractorConfig,
    pub images: &'a dyn ImageDescriber,
}

impl std::fmt::Debug for AdapterContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterContext")
            .field("mime_type", &self.mime_type)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait DocumentAdapter: Plugin {
    /// MIME types this adapter is registered under.
    fn supported_mime_types(&self) -> &[&str];

    /// Extract ordered text from in-memory bytes.
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String>;

    /// Extract from a file. The default reads the whole file first.
    async fn extract_file(&self, path: &Path, ctx: &AdapterContext<'_>) -> Result<String> {
        let bytes = crate::core::io::read_file_async(path).await?;
        self.extract(&bytes, ctx).await
    }
}
