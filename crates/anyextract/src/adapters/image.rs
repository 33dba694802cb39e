//! Image adapter: OCR or vision-model description of JPEG, PNG and WebP images.
//!
//! Images only produce text when [`ExtractionOptions::extract_images`] is set.
//! The same adapter describes pictures embedded in Word, Excel and PowerPoint
//! packages, reached through the engine's [`ImageDescriber`] routing.
//!
//! [`ExtractionOptions::extract_images`]: crate::core::config::ExtractionOptions::extract_images
//! [`ImageDescriber`]: crate::plugins::ImageDescriber

use crate::core::config::ImageExtractionMethod;
use crate::core::mime::{IMAGE_MIME_TYPES, detect_mime_type_from_bytes};
use crate::plugins::{AdapterContext, DocumentAdapter, OcrBackend, Plugin};
use crate::vision::VisionClient;
use crate::{AnyExtractError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ImageAdapter {
    ocr: Arc<dyn OcrBackend>,
    vision: VisionClient,
}

impl ImageAdapter {
    pub fn new(ocr: Arc<dyn OcrBackend>, vision: VisionClient) -> Self {
        Self { ocr, vision }
    }
}

impl Plugin for ImageAdapter {
    fn name(&self) -> &str {
        "image-adapter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        self.ocr.initialize()
    }

    fn shutdown(&self) -> Result<()> {
        self.ocr.shutdown()
    }

    fn description(&self) -> &str {
        "Recognizes or describes the content of JPEG, PNG and WebP images"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for ImageAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        IMAGE_MIME_TYPES
    }

    #[tracing::instrument(skip(self, content, ctx), fields(adapter = self.name(), size_bytes = content.len()))]
    async fn extract(&self, content: &[u8], ctx: &AdapterContext<'_>) -> Result<String> {
        if !ctx.options.extract_images {
            return Ok(String::new());
        }

        let mime_type = detect_mime_type_from_bytes(content)
            .ok_or_else(|| AnyExtractError::corrupted_document("Unable to detect the image type"))?;
        if !IMAGE_MIME_TYPES.contains(&mime_type.as_str()) {
            tracing::debug!(mime_type = %mime_type, "not a describable image, skipping");
            return Ok(String::new());
        }

        match ctx.options.image_extraction_method {
            ImageExtractionMethod::Ocr => self.ocr.recognize_text(content, &ctx.options.language).await,
            ImageExtractionMethod::Llm => {
                let vision = ctx.config.vision.as_ref().ok_or_else(|| {
                    AnyExtractError::configuration(
                        "A vision provider, model and API key are required for LLM image extraction",
                    )
                })?;
                self.vision.describe(content, &mime_type, vision).await
            }
        }
    }
}
