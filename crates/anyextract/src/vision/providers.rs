//! Request and response shapes of the supported vision APIs.

use serde::{Deserialize, Serialize};

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";
pub(crate) const ANTHROPIC_MAX_TOKENS: u32 = 300;

// OpenAI chat completions

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiMessage<'a> {
    pub role: &'static str,
    pub content: Vec<OpenAiContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: OpenAiImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiChoice {
    pub message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiResponseMessage {
    pub content: Option<String>,
}

impl<'a> OpenAiRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, mime_type: &str, data: &str) -> Self {
        Self {
            model,
            messages: vec![OpenAiMessage {
                role: "user",
                content: vec![
                    OpenAiContentPart::Text { text: prompt },
                    OpenAiContentPart::ImageUrl {
                        image_url: OpenAiImageUrl {
                            url: format!("data:{};base64,{}", mime_type, data),
                        },
                    },
                ],
            }],
        }
    }
}

impl OpenAiResponse {
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|choice| choice.message.content)
    }
}

// Google Gemini generateContent

#[derive(Debug, Serialize)]
pub(crate) struct GeminiRequest<'a> {
    pub contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiContent<'a> {
    pub parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiInlineData<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidate {
    pub content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponsePart {
    pub text: Option<String>,
}

impl<'a> GeminiRequest<'a> {
    pub fn new(prompt: &'a str, mime_type: &'a str, data: &'a str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text { text: prompt },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData { mime_type, data },
                    },
                ],
            }],
        }
    }
}

impl GeminiResponse {
    pub fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
    }
}

// Anthropic messages

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicMessage<'a> {
    pub role: &'static str,
    pub content: Vec<AnthropicContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum AnthropicContentPart<'a> {
    Text { text: &'a str },
    Image { source: AnthropicImageSource<'a> },
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicImageSource<'a> {
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: &'a str,
    pub data: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicResponseBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicResponseBlock {
    pub text: Option<String>,
}

impl<'a> AnthropicRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, media_type: &'a str, data: &'a str) -> Self {
        Self {
            model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    AnthropicContentPart::Text { text: prompt },
                    AnthropicContentPart::Image {
                        source: AnthropicImageSource {
                            source_type: "base64",
                            media_type,
                            data,
                        },
                    },
                ],
            }],
        }
    }
}

impl AnthropicResponse {
    pub fn into_text(self) -> Option<String> {
        self.content.into_iter().next().and_then(|block| block.text)
    }
}
