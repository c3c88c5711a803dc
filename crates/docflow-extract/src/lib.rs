//! Docflow Extraction Adapter
//!
//! Maps a source file to extracted text or a failure. Two capabilities sit
//! behind one dispatch:
//!
//! - **Images** are transcribed by the vision model with a configured OCR
//!   prompt, attached as a base64 `data:` URL.
//! - **Documents** surrender their embedded text layer via `pdf-extract`;
//!   embedded raster content is ignored by contract.
//!
//! The adapter owns no routing policy: it returns `Ok(text)` or a typed
//! error, and the orchestrator decides which folder the source lands in.

#![warn(missing_docs)]

mod error;
mod extractor;
mod image;
mod pdf;

pub use error::ExtractError;
pub use extractor::TextExtractor;
pub use image::encode_image;
pub use pdf::document_text;
