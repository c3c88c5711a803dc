//! OpenAI-compatible chat-completions client
//!
//! Talks to any endpoint exposing `/v1/chat/completions` (llama-server,
//! Ollama in compatibility mode, vLLM). Vision requests attach the image
//! as a base64 `data:` URL content part; text requests send a plain string
//! content. One request per call, no streaming; the retry is the next
//! pipeline pass, not this client.

use crate::LlmError;
use docflow_domain::traits::{ChatModel, EncodedImage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout; vision transcriptions on CPU are slow
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct ChatClient {
    chat_url: String,
    client: reqwest::Client,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageUrl,
    },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ChatClient {
    /// Create a client for the given endpoint base URL
    ///
    /// # Parameters
    ///
    /// - `endpoint`: base URL, e.g. `http://localhost:8080`
    /// - `timeout_secs`: whole-request timeout; a timeout surfaces as
    ///   [`LlmError::Communication`]
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap();

        let endpoint = endpoint.into();
        Self {
            chat_url: format!("{}/v1/chat/completions", endpoint.trim_end_matches('/')),
            client,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send(&self, content: MessageContent) -> Result<String, LlmError> {
        let request = ChatRequest {
            messages: vec![Message {
                role: "user",
                content,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
    }
}

impl ChatModel for ChatClient {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.send(MessageContent::Text(prompt.to_string())).await
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, LlmError> {
        let parts = vec![
            ContentPart::Text {
                text: prompt.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                },
            },
        ];
        self.send(MessageContent::Parts(parts)).await
    }
}
