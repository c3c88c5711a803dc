//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Infrastructure implementations live in other crates.

use std::future::Future;

/// An image payload ready for an inference request
///
/// The bytes are already base64-encoded by the adapter that read the file;
/// the domain layer only carries them to the model seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type, e.g. `image/jpeg`
    pub media_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl EncodedImage {
    /// Render as a `data:` URL for OpenAI-compatible vision payloads
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Trait for chat-completion model calls
///
/// Implemented by the infrastructure layer (docflow-llm). One blocking
/// call per invocation; retry policy belongs to the caller's next pass,
/// not to this seam.
pub trait ChatModel {
    /// Error type for model operations
    type Error;

    /// Generate a completion for a text-only prompt
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Generate a completion for a prompt with an attached image
    fn generate_with_image(
        &self,
        prompt: &str,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_shape() {
        let image = EncodedImage {
            media_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
