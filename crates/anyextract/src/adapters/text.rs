//! Plain text and JSON adapter: bytes are returned as UTF-8, invalid sequences
//! replaced.

use crate::Result;
use crate::core::mime::{JSON_MIME_TYPE, PLAIN_TEXT_MIME_TYPE};
use crate::plugins::{AdapterContext, DocumentAdapter, Plugin};
use async_trait::async_trait;

pub struct PlainTextAdapter;

impl PlainTextAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextAdapter {
    fn name(&self) -> &str {
        "plain-text-adapter"
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
        "Returns plain text and JSON content verbatim"
    }

    fn author(&self) -> &str {
        "AnyExtract Team"
    }
}

#[async_trait]
impl DocumentAdapter for PlainTextAdapter {
    fn supported_mime_types(&self) -> &[&str] {
        &[PLAIN_TEXT_MIME_TYPE, JSON_MIME_TYPE]
    }

    async fn extract(&self, content: &[u8], _ctx: &AdapterContext<'_>) -> Result<String> {
        Ok(String::from_utf8_lossy(content).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ExtractionOptions, ExtractorConfig};
    use crate::plugins::NoImages;

    #[tokio::test]
    async fn test_plain_text_is_verbatim() {
        let adapter = PlainTextAdapter::new();
        let options = ExtractionOptions::default();
        let config = ExtractorConfig::default();
        let ctx = AdapterContext {
            mime_type: JSON_MIME_TYPE,
            options: &options,
            config: &config,
            images: &NoImages,
        };

        let json = br#"{"name": "report", "pages": 3}"#;
        assert_eq!(adapter.extract(json, &ctx).await.unwrap(), r#"{"name": "report", "pages": 3}"#);

        let lossy = adapter.extract(b"caf\xe9 ok", &ctx).await.unwrap();
        assert_eq!(lossy, "caf\u{fffd} ok");
    }
}
