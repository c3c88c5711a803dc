//! Image payload preparation for vision OCR

use crate::error::ExtractError;
use base64::Engine as _;
use docflow_domain::traits::EncodedImage;
use std::path::Path;

/// MIME type for an image extension, with a jpeg fallback for anything
/// the endpoint is likely to accept anyway
fn media_type(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "image/jpeg",
    }
}

/// Read an image file and base64-encode it for a vision request
pub async fn encode_image(path: &Path) -> Result<EncodedImage, ExtractError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = tokio::fs::read(path).await?;
    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);

    Ok(EncodedImage {
        media_type: media_type(&extension).to_string(),
        data,
    })
}
