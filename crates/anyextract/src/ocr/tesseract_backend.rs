//! `tesseract` command line backend.

use crate::core::config::OcrSettings;
use crate::error::{AnyExtractError, Result};
use crate::ocr::languages::is_supported_language;
use crate::plugins::{OcrBackend, OcrBackendType, Plugin};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Default timeout for one recognition run (120 seconds)
const TESSERACT_TIMEOUT_SECONDS: u64 = 120;

/// Runs `tesseract stdin stdout -l <lang>` once per image.
#[derive(Debug, Clone)]
pub struct TesseractCliBackend {
    command: String,
    timeout: Duration,
}

impl TesseractCliBackend {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            command: settings.tesseract_command.clone(),
            timeout: Duration::from_secs(TESSERACT_TIMEOUT_SECONDS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for TesseractCliBackend {
    fn default() -> Self {
        Self::new(&OcrSettings::default())
    }
}

impl Plugin for TesseractCliBackend {
    fn name(&self) -> &str {
        "tesseract"
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
        "Tesseract OCR through the tesseract executable"
    }
}

#[async_trait]
impl OcrBackend for TesseractCliBackend {
    async fn recognize_text(&self, image: &[u8], language: &str) -> Result<String> {
        if !self.supports_language(language) {
            return Err(AnyExtractError::ocr(format!("Unsupported OCR language: '{}'", language)));
        }

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AnyExtractError::ocr_with_source(format!("Failed to execute {}", self.command), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // tesseract may exit before consuming stdin (bad image, missing traineddata);
            // its exit status and stderr carry the real cause.
            if let Err(e) = stdin.write_all(image).await {
                tracing::debug!(error = %e, "tesseract closed stdin early");
            }
        }

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(AnyExtractError::ocr_with_source("Failed to wait for tesseract", e)),
            Err(_) => {
                return Err(AnyExtractError::ocr(format!(
                    "OCR timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnyExtractError::ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(language, bytes = image.len(), chars = text.len(), "tesseract finished");
        Ok(text.trim().to_string())
    }

    fn supports_language(&self, lang: &str) -> bool {
        is_supported_language(lang)
    }

    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }
}
