//! Built-in format adapters.
//!
//! Every adapter implements [`DocumentAdapter`] and is registered by
//! [`register_default_adapters`] when an [`Engine`](crate::Engine) is built with
//! [`Engine::new`](crate::Engine::new).

use crate::Result;
use crate::core::config::ExtractorConfig;
use crate::ocr::TesseractCliBackend;
use crate::plugins::{AdapterContext, AdapterRegistry, DocumentAdapter};
use crate::vision::VisionClient;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

pub mod docx;
pub mod image;
pub mod odf;
pub mod pptx;
pub mod text;
pub mod xlsx;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use docx::DocxAdapter;
pub use image::ImageAdapter;
pub use odf::OdfAdapter;
pub use pptx::PptxAdapter;
pub use text::PlainTextAdapter;
pub use xlsx::XlsxAdapter;

#[cfg(feature = "pdf")]
pub use pdf::PdfAdapter;

/// Register the built-in adapters.
///
/// The image adapter runs OCR through the `tesseract` command from
/// `config.ocr` and sends vision requests through `http`.
pub fn register_default_adapters(
    registry: &mut AdapterRegistry,
    config: &ExtractorConfig,
    http: &reqwest::Client,
) -> Result<()> {
    let ocr = Arc::new(TesseractCliBackend::new(&config.ocr));
    let vision = VisionClient::new(http.clone());

    let mut adapters: Vec<Arc<dyn DocumentAdapter>> = vec![
        Arc::new(DocxAdapter::new()),
        Arc::new(PptxAdapter::new()),
        Arc::new(XlsxAdapter::new()),
        Arc::new(OdfAdapter::new()),
    ];
    #[cfg(feature = "pdf")]
    adapters.push(Arc::new(PdfAdapter::new()));
    adapters.push(Arc::new(PlainTextAdapter::new()));
    adapters.push(Arc::new(ImageAdapter::new(ocr, vision)));

    for adapter in adapters {
        registry.register(adapter)?;
    }
    Ok(())
}

/// Describe the images named by `refs`, in order.
///
/// Descriptions run concurrently but come back index-aligned with `refs`. A
/// reference without bytes in `media`, a failure or a timeout yields an empty
/// description for that image only. Nothing is described unless the options
/// ask for images.
pub(crate) async fn describe_images(
    refs: &[&str],
    media: &HashMap<String, Vec<u8>>,
    ctx: &AdapterContext<'_>,
) -> Vec<String> {
    if !ctx.options.extract_images {
        return vec![String::new(); refs.len()];
    }

    let limit = Duration::from_secs(ctx.config.http.timeout_secs);
    let pending = refs.iter().map(|reference| async move {
        let Some(bytes) = media.get(*reference) else {
            return String::new();
        };
        match timeout(limit, ctx.images.describe_image(bytes, ctx.options)).await {
            Ok(Ok(description)) => description,
            Ok(Err(e)) => {
                tracing::warn!(image = %reference, error = %e, "image description failed, leaving it empty");
                String::new()
            }
            Err(_) => {
                tracing::warn!(image = %reference, "image description timed out, leaving it empty");
                String::new()
            }
        }
    });

    join_all(pending).await
}
