//! Docflow LLM Client Layer
//!
//! Implementations of the `ChatModel` trait from `docflow-domain`.
//!
//! # Providers
//!
//! - `ChatClient`: OpenAI-compatible `/v1/chat/completions` endpoint
//!   (llama-server, Ollama in compatibility mode, and friends)
//! - `MockModel`: deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use docflow_llm::MockModel;
//! use docflow_domain::traits::ChatModel;
//!
//! # tokio_test::block_on(async {
//! let model = MockModel::new("Hello from the model");
//! let result = model.generate("any prompt").await.unwrap();
//! assert_eq!(result, "Hello from the model");
//! # });
//! ```

#![warn(missing_docs)]

pub mod chat;

use docflow_domain::traits::{ChatModel, EncodedImage};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use chat::ChatClient;

/// Errors that can occur during model calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network-level error: unreachable endpoint, timeout, connection reset
    #[error("Communication error: {0}")]
    Communication(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code returned by the endpoint
        status: u16,
        /// Response body, for the log
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Mock model for deterministic testing
///
/// Returns pre-configured responses without any network calls. Responses
/// are keyed by a substring of the prompt so tests don't have to reproduce
/// full prompt templates; the first configured needle that matches wins.
///
/// # Examples
///
/// ```
/// use docflow_llm::MockModel;
/// use docflow_domain::traits::ChatModel;
///
/// # tokio_test::block_on(async {
/// let mut model = MockModel::new("fallback");
/// model.add_response("invoice-42", r#"{"confidence": 0.9}"#);
/// assert_eq!(
///     model.generate("... invoice-42 ...").await.unwrap(),
///     r#"{"confidence": 0.9}"#
/// );
/// assert_eq!(model.generate("something else").await.unwrap(), "fallback");
/// assert_eq!(model.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockModel {
    default_response: String,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: Vec<(String, String)>,
    errors: Vec<String>,
    call_count: usize,
}

impl MockModel {
    /// Create a mock returning a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Add a response for prompts containing the given needle
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push((needle.into(), response.into()));
    }

    /// Make prompts containing the given needle fail
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.inner.lock().unwrap().errors.push(needle.into());
    }

    /// Number of calls made so far, text and vision combined
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().call_count
    }

    /// Reset the call counter
    pub fn reset_call_count(&self) {
        self.inner.lock().unwrap().call_count = 0;
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.inner.lock().unwrap();
        state.call_count += 1;

        if state.errors.iter().any(|needle| prompt.contains(needle)) {
            return Err(LlmError::Communication("mock error".to_string()));
        }

        for (needle, response) in &state.responses {
            if prompt.contains(needle) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ChatModel for MockModel {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.respond(prompt)
    }

    async fn generate_with_image(
        &self,
        prompt: &str,
        _image: &EncodedImage,
    ) -> Result<String, LlmError> {
        self.respond(prompt)
    }
}
