//! Messages API client.
//!
//! Everything above this module talks to a [`CompletionBackend`], so tests
//! and dry runs never need the network.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AssistantConfig;
use crate::error::{LlmError, Result};

const API_VERSION: &str = "2023-06-01";

const USER_AGENT_VALUE: &str = concat!("bloodwork/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// Base64 image payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn png(data: String) -> Self {
        Self {
            kind: "base64",
            media_type: "image/png".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

/// One Messages API call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<Message>,
}

impl MessageRequest {
    /// A single user turn.
    pub fn user(
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        content: Vec<ContentBlock>,
    ) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
            messages: vec![Message {
                role: Role::User,
                content,
            }],
        }
    }
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turns a request into the model's text reply.
pub trait CompletionBackend {
    fn complete(&self, request: &MessageRequest) -> Result<String>;
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for &T {
    fn complete(&self, request: &MessageRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// Blocking HTTP backend for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    url: String,
}

impl AnthropicClient {
    /// Builds a client; fails when no API key is configured.
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let mut key = HeaderValue::from_str(config.require_api_key()?)
            .map_err(|_| LlmError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT_VALUE)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.messages_url(),
        })
    }
}

impl CompletionBackend for AnthropicClient {
    fn complete(&self, request: &MessageRequest) -> Result<String> {
        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            "sending message request"
        );
        let response = self.client.post(&self.url).json(request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }
        let parsed: MessageResponse = response.json()?;
        first_text(parsed)
    }
}

fn api_error(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

fn first_text(response: MessageResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .ok_or(LlmError::EmptyResponse)
}
