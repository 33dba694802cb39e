//! The extraction engine: MIME routing over a registry of format adapters.
//!
//! [`Engine::parse`] acquires bytes (in memory, from disk or over HTTP), sniffs
//! their MIME type and hands them to the adapter registered for it:
//!
//! - no detectable MIME type: the bytes are returned as (lossy) UTF-8
//! - a MIME type without adapter: `UnsupportedFormat` naming it
//! - otherwise: the adapter's output
//!
//! The engine also describes images embedded in documents. It implements
//! [`ImageDescriber`] by sniffing the image bytes and routing them through the
//! same registry, so a custom adapter registered for `image/png` is used for
//! pictures inside Word files too.

use crate::adapters::register_default_adapters;
use crate::core::config::{ExtractionOptions, ExtractorConfig, WikiExtractionOptions};
use crate::core::io::{build_http_client, fetch_bytes, looks_like_url, read_file_async};
use crate::core::mime::{InferMimeDetector, MimeDetector};
use crate::plugins::{AdapterContext, AdapterRegistry, DocumentAdapter, ImageDescriber, Plugin};
use crate::types::{ContentItem, ContentKind};
use crate::wiki::{self, ConfluenceClient};
use crate::{AnyExtractError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static DEFAULT_OPTIONS: Lazy<ExtractionOptions> = Lazy::new(ExtractionOptions::default);

/// What [`Engine::parse`] reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseInput {
    Bytes(Vec<u8>),
    Path(PathBuf),
    Url(String),
}

/// Strings that parse as `http`/`https` URLs are downloaded; anything else is a
/// file path.
impl From<&str> for ParseInput {
    fn from(input: &str) -> Self {
        if looks_like_url(input) {
            ParseInput::Url(input.to_string())
        } else {
            ParseInput::Path(PathBuf::from(input))
        }
    }
}

impl From<String> for ParseInput {
    fn from(input: String) -> Self {
        ParseInput::from(input.as_str())
    }
}

impl From<PathBuf> for ParseInput {
    fn from(path: PathBuf) -> Self {
        ParseInput::Path(path)
    }
}

impl From<&Path> for ParseInput {
    fn from(path: &Path) -> Self {
        ParseInput::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ParseInput {
    fn from(bytes: Vec<u8>) -> Self {
        ParseInput::Bytes(bytes)
    }
}

impl From<&[u8]> for ParseInput {
    fn from(bytes: &[u8]) -> Self {
        ParseInput::Bytes(bytes.to_vec())
    }
}

/// MIME-routing extraction engine.
///
/// Construct once and call many times; the adapter registry only changes
/// through [`register_adapter`](Self::register_adapter), which needs `&mut self`.
///
/// # Example
///
/// ```rust,no_run
/// use anyextract::{Engine, ExtractionOptions, ExtractorConfig};
///
/// # async fn example() -> anyextract::Result<()> {
/// let engine = Engine::new(ExtractorConfig::default())?;
/// let text = engine.parse("report.docx", None, Some(&ExtractionOptions::default())).await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    registry: AdapterRegistry,
    config: ExtractorConfig,
    detector: Box<dyn MimeDetector>,
    http: reqwest::Client,
}

impl Engine {
    /// Engine with every built-in adapter registered.
    ///
    /// # Errors
    ///
    /// `Configuration` if the HTTP client cannot be built; adapter
    /// initialization errors are passed through.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let mut engine = Self::empty(config)?;
        register_default_adapters(&mut engine.registry, &engine.config, &engine.http)?;
        Ok(engine)
    }

    /// Engine without adapters. Every detectable input fails with
    /// `UnsupportedFormat` until adapters are registered.
    pub fn empty(config: ExtractorConfig) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        Ok(Self {
            registry: AdapterRegistry::new(),
            config,
            detector: Box::new(InferMimeDetector),
            http,
        })
    }

    /// Replace the MIME sniffer.
    pub fn with_detector(mut self, detector: impl MimeDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Shared HTTP client, configured from [`HttpSettings`](crate::core::config::HttpSettings).
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Register `adapter` for each of its MIME types, replacing earlier owners.
    pub fn register_adapter(&mut self, adapter: Arc<dyn DocumentAdapter>) -> Result<()> {
        self.registry.register(adapter)
    }

    /// MIME types with a registered adapter, in registration order.
    pub fn list_registered_mime_types(&self) -> Vec<String> {
        self.registry.mime_types()
    }

    /// Extract text from bytes, a file path or a URL.
    ///
    /// `auth_header` is sent as the `Authorization` value when downloading a
    /// URL and ignored otherwise. `None` options extract without images.
    ///
    /// # Errors
    ///
    /// - `Io` for unreadable paths and failed downloads
    /// - `UnsupportedFormat` when the detected MIME type has no adapter
    /// - any error of the selected adapter
    pub async fn parse(
        &self,
        input: impl Into<ParseInput>,
        auth_header: Option<&str>,
        options: Option<&ExtractionOptions>,
    ) -> Result<String> {
        let options = options.unwrap_or(&DEFAULT_OPTIONS);
        match input.into() {
            ParseInput::Bytes(bytes) => self.parse_bytes(&bytes, options).await,
            ParseInput::Path(path) => self.parse_file(&path, options).await,
            ParseInput::Url(url) => {
                let bytes = fetch_bytes(&self.http, &url, auth_header).await?;
                self.parse_bytes(&bytes, options).await
            }
        }
    }

    /// Read `path` and extract it.
    #[tracing::instrument(skip(self, path, options), fields(path = %path.as_ref().display()))]
    pub async fn parse_file(&self, path: impl AsRef<Path>, options: &ExtractionOptions) -> Result<String> {
        let bytes = read_file_async(path.as_ref()).await?;
        self.parse_bytes(&bytes, options).await
    }

    /// Sniff the MIME type of `bytes` and extract them.
    #[tracing::instrument(skip(self, bytes, options), fields(size_bytes = bytes.len()))]
    pub async fn parse_bytes(&self, bytes: &[u8], options: &ExtractionOptions) -> Result<String> {
        match self.detector.detect(bytes) {
            Some(mime_type) => self.parse_bytes_as(bytes, &mime_type, options).await,
            None => {
                tracing::debug!("no MIME type detected, returning raw text");
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Extract `bytes` with the adapter registered for `mime_type`, skipping
    /// detection.
    pub async fn parse_bytes_as(&self, bytes: &[u8], mime_type: &str, options: &ExtractionOptions) -> Result<String> {
        let adapter = self.registry.get(mime_type)?;
        tracing::debug!(mime_type, adapter = adapter.name(), "dispatching to adapter");

        let ctx = AdapterContext {
            mime_type,
            options,
            config: &self.config,
            images: self,
        };
        adapter.extract(bytes, &ctx).await
    }

    /// Extract a Confluence page.
    ///
    /// Images become `[Image: <description>]` when `options.images` asks for
    /// image extraction and a description comes back, and their download URL
    /// otherwise. Attachments are downloaded and extracted when
    /// `options.extract_attachments` is set, and left as URLs otherwise. A
    /// failed image or attachment falls back to its URL.
    ///
    /// # Errors
    ///
    /// `Configuration` without complete Confluence credentials;
    /// `UpstreamService` when the page cannot be fetched.
    #[tracing::instrument(skip(self, options))]
    pub async fn parse_wiki_page(&self, page_id: &str, options: &WikiExtractionOptions) -> Result<String> {
        let client = self.confluence_client()?;
        let items = wiki::fetch_page_items(&client, page_id, self.config.limits.max_depth).await?;

        let resolved = join_all(items.iter().map(|item| self.resolve_wiki_item(item, &client, options))).await;
        Ok(resolved
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Ordered items of a Confluence page, images and attachments left as
    /// download URLs.
    pub async fn wiki_page_items(&self, page_id: &str) -> Result<Vec<ContentItem>> {
        let client = self.confluence_client()?;
        wiki::fetch_page_items(&client, page_id, self.config.limits.max_depth).await
    }

    fn confluence_client(&self) -> Result<ConfluenceClient> {
        let confluence = self
            .config
            .confluence
            .as_ref()
            .filter(|c| !c.base_url.trim().is_empty() && !c.email.trim().is_empty() && !c.api_key.trim().is_empty())
            .ok_or_else(|| {
                AnyExtractError::configuration("Confluence base URL, email and API key are required for wiki pages")
            })?;
        Ok(ConfluenceClient::new(confluence, self.http.clone()))
    }

    async fn resolve_wiki_item(
        &self,
        item: &ContentItem,
        client: &ConfluenceClient,
        options: &WikiExtractionOptions,
    ) -> String {
        let url = item.content.as_str();
        match item.kind {
            ContentKind::Image if options.images.extract_images && !url.is_empty() => {
                match self.describe_remote_image(url, client, &options.images).await {
                    Ok(description) if !description.trim().is_empty() => format!("[Image: {}]", description.trim()),
                    Ok(_) => url.to_string(),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "wiki image description failed, keeping its URL");
                        url.to_string()
                    }
                }
            }
            ContentKind::Attachment if options.extract_attachments && !url.is_empty() => {
                match self.extract_remote_attachment(url, client, &options.images).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(url, error = %e, "wiki attachment extraction failed, keeping its URL");
                        url.to_string()
                    }
                }
            }
            _ => item.content.clone(),
        }
    }

    async fn describe_remote_image(
        &self,
        url: &str,
        client: &ConfluenceClient,
        options: &ExtractionOptions,
    ) -> Result<String> {
        let bytes = fetch_bytes(&self.http, url, Some(client.auth_header())).await?;
        self.describe_image(&bytes, options).await
    }

    async fn extract_remote_attachment(
        &self,
        url: &str,
        client: &ConfluenceClient,
        options: &ExtractionOptions,
    ) -> Result<String> {
        let bytes = fetch_bytes(&self.http, url, Some(client.auth_header())).await?;
        self.parse_bytes(&bytes, options).await
    }
}

#[async_trait]
impl ImageDescriber for Engine {
    async fn describe_image(&self, image: &[u8], options: &ExtractionOptions) -> Result<String> {
        let Some(mime_type) = self.detector.detect(image) else {
            tracing::debug!(size_bytes = image.len(), "embedded media has no detectable type, skipping");
            return Ok(String::new());
        };
        if !self.registry.contains(&mime_type) {
            tracing::debug!(mime_type = %mime_type, "no adapter for embedded media, skipping");
            return Ok(String::new());
        }
        self.parse_bytes_as(image, &mime_type, options).await
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfluenceConfig;
    use crate::core::mime::JSON_MIME_TYPE;

    struct UpperCaseJson;

    impl Plugin for UpperCaseJson {
        fn name(&self) -> &str {
            "upper-json"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentAdapter for UpperCaseJson {
        fn supported_mime_types(&self) -> &[&str] {
            &[JSON_MIME_TYPE]
        }

        async fn extract(&self, content: &[u8], _ctx: &AdapterContext<'_>) -> Result<String> {
            Ok(String::from_utf8_lossy(content).to_uppercase())
        }
    }

    /// Reports every input as JSON.
    struct AlwaysJson;

    impl MimeDetector for AlwaysJson {
        fn detect(&self, _bytes: &[u8]) -> Option<String> {
            Some(JSON_MIME_TYPE.to_string())
        }
    }

    #[test]
    fn test_parse_input_classification() {
        assert_eq!(
            ParseInput::from("https://example.com/a.docx"),
            ParseInput::Url("https://example.com/a.docx".to_string())
        );
        assert_eq!(
            ParseInput::from("reports/a.docx"),
            ParseInput::Path(PathBuf::from("reports/a.docx"))
        );
        assert_eq!(ParseInput::from(vec![1u8, 2]), ParseInput::Bytes(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_undetectable_bytes_returned_as_text() {
        let engine = Engine::empty(ExtractorConfig::default()).unwrap();
        let text = engine.parse(b"just some words".as_slice(), None, None).await.unwrap();
        assert_eq!(text, "just some words");
    }

    #[tokio::test]
    async fn test_unregistered_mime_is_unsupported() {
        let engine = Engine::empty(ExtractorConfig::default()).unwrap().with_detector(AlwaysJson);
        let err = engine.parse(b"{}".as_slice(), None, None).await.unwrap_err();
        match err {
            AnyExtractError::UnsupportedFormat(mime) => assert_eq!(mime, JSON_MIME_TYPE),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert_eq!(
            engine.parse(b"{}".as_slice(), None, None).await.unwrap_err().to_string(),
            "No extraction method registered for MIME type 'application/json'"
        );
    }

    #[tokio::test]
    async fn test_registered_adapter_is_used() {
        let mut engine = Engine::empty(ExtractorConfig::default()).unwrap().with_detector(AlwaysJson);
        engine.register_adapter(Arc::new(UpperCaseJson)).unwrap();
        assert_eq!(engine.list_registered_mime_types(), vec![JSON_MIME_TYPE.to_string()]);

        let text = engine.parse(br#"{"a": "b"}"#.as_slice(), None, None).await.unwrap();
        assert_eq!(text, r#"{"A": "B"}"#);
    }

    #[tokio::test]
    async fn test_describe_image_without_adapter_is_empty() {
        let engine = Engine::empty(ExtractorConfig::default()).unwrap();
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        let description = engine.describe_image(png, &ExtractionOptions::default()).await.unwrap();
        assert_eq!(description, "");
    }

    #[tokio::test]
    async fn test_wiki_requires_credentials() {
        let engine = Engine::empty(ExtractorConfig::default()).unwrap();
        let err = engine
            .parse_wiki_page("123", &WikiExtractionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnyExtractError::Configuration { .. }));

        let config = ExtractorConfig {
            confluence: Some(ConfluenceConfig {
                base_url: "https://acme.atlassian.net".to_string(),
                email: "user@example.com".to_string(),
                api_key: String::new(),
                deployment: None,
            }),
            ..Default::default()
        };
        let engine = Engine::empty(config).unwrap();
        let err = engine.wiki_page_items("123").await.unwrap_err();
        assert!(matches!(err, AnyExtractError::Configuration { .. }));
    }
}
