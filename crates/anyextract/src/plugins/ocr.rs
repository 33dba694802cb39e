//! OCR backend plugin trait.

use crate::Result;
use crate::plugins::Plugin;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrBackendType {
    Tesseract,
    Custom,
}

/// Turns image bytes into text.
///
/// # Example
///
/// ```rust
/// use anyextract::plugins::{OcrBackend, OcrBackendType, Plugin};
/// use anyextract::Result;
/// use async_trait::async_trait;
///
/// struct FixedOcr;
///
/// impl Plugin for FixedOcr {
///     fn name(&self) -> &str { "fixed-ocr" }
///     fn version(&self) -> String { "1.0.0".to_string() }
///     fn initialize(&self) -> Result<()> { Ok(()) }
///     fn shutdown(&self) -> Result<()> { Ok(()) }
/// }
///
/// #[async_trait]
/// impl OcrBackend for FixedOcr {
///     async fn recognize_text(&self, _image: &[u8], _language: &str) -> Result<String> {
///         Ok("recognized".to_string())
///     }
///     fn supports_language(&self, lang: &str) -> bool { lang == "eng" }
///     fn backend_type(&self) -> OcrBackendType { OcrBackendType::Custom }
/// }
/// ```
#[async_trait]
pub trait OcrBackend: Plugin {
    /// Recognize text in `image` using a Tesseract-style language code.
    async fn recognize_text(&self, image: &[u8], language: &str) -> Result<String>;

    fn supports_language(&self, lang: &str) -> bool;

    fn backend_type(&self) -> OcrBackendType;
}
