//! Image description through hosted vision models.
//!
//! [`VisionClient`] sends one image plus a fixed summarization prompt to the
//! configured provider and returns the model's text. Each provider has its own
//! endpoint, authentication and payload shape.

mod providers;

use crate::core::config::{VisionConfig, VisionProvider};
use crate::error::{AnyExtractError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use providers::{
    ANTHROPIC_VERSION, AnthropicRequest, AnthropicResponse, GeminiRequest, GeminiResponse, OpenAiRequest,
    OpenAiResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Instruction sent with every image.
pub const IMAGE_SUMMARY_PROMPT: &str = "Provide a concise summary of the image for semantic search. \
Exclude any introductions, labels, or formatting, just return the core content. \
Also include visible text and contextual details about layout, content type, or purpose.";

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Async client for the three supported vision providers.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl VisionClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http, base_url: None }
    }

    /// Send every provider's requests to `base_url` instead of its public host.
    /// Paths are unchanged.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn endpoint(&self, provider: VisionProvider, model: &str) -> String {
        let default_base = match provider {
            VisionProvider::OpenAi => OPENAI_BASE_URL,
            VisionProvider::Google => GOOGLE_BASE_URL,
            VisionProvider::Anthropic => ANTHROPIC_BASE_URL,
        };
        let base = self.base_url.as_deref().unwrap_or(default_base);
        match provider {
            VisionProvider::OpenAi => format!("{}/v1/chat/completions", base),
            VisionProvider::Google => format!("{}/v1beta/models/{}:generateContent", base, model),
            VisionProvider::Anthropic => format!("{}/v1/messages", base),
        }
    }

    /// Describe `image` (of type `mime_type`) with the model in `config`.
    ///
    /// # Errors
    ///
    /// - `Configuration` when the model or API key is empty
    /// - `UpstreamService` on transport failures, non-success statuses, or a
    ///   response without text
    pub async fn describe(&self, image: &[u8], mime_type: &str, config: &VisionConfig) -> Result<String> {
        if config.model.trim().is_empty() || config.api_key.trim().is_empty() {
            return Err(AnyExtractError::configuration(format!(
                "Vision provider '{}' requires a model and an API key",
                config.provider
            )));
        }

        let data = STANDARD.encode(image);
        let url = self.endpoint(config.provider, &config.model);
        tracing::debug!(provider = %config.provider, model = %config.model, bytes = image.len(), "describing image");

        let text = match config.provider {
            VisionProvider::OpenAi => {
                let body = OpenAiRequest::new(&config.model, IMAGE_SUMMARY_PROMPT, mime_type, &data);
                let request = self.http.post(&url).bearer_auth(&config.api_key);
                send::<_, OpenAiResponse>(request, &body, config.provider)
                    .await?
                    .into_text()
            }
            VisionProvider::Google => {
                let body = GeminiRequest::new(IMAGE_SUMMARY_PROMPT, mime_type, &data);
                let request = self.http.post(&url).query(&[("key", config.api_key.as_str())]);
                send::<_, GeminiResponse>(request, &body, config.provider)
                    .await?
                    .into_text()
            }
            VisionProvider::Anthropic => {
                let body = AnthropicRequest::new(&config.model, IMAGE_SUMMARY_PROMPT, mime_type, &data);
                let request = self
                    .http
                    .post(&url)
                    .header("x-api-key", &config.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION);
                send::<_, AnthropicResponse>(request, &body, config.provider)
                    .await?
                    .into_text()
            }
        };

        text.map(|t| t.trim().to_string()).ok_or_else(|| {
            AnyExtractError::upstream_service(format!("{} response did not contain any text", config.provider))
        })
    }
}

async fn send<B, R>(request: reqwest::RequestBuilder, body: &B, provider: VisionProvider) -> Result<R>
where
    B: Serialize,
    R: DeserializeOwned,
{
    let response = request.json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(AnyExtractError::upstream_service(format!(
            "{} API error: HTTP {}: {}",
            provider, status, text
        )));
    }

    response.json::<R>().await.map_err(|e| {
        AnyExtractError::upstream_service_with_source(format!("Failed to decode {} response", provider), e)
    })
}
