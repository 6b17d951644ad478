//! Export module for Snapcode
//!
//! Encodes a captured region into a transport-ready image payload.

mod payload;
mod png;

pub use payload::ImagePayload;
pub use png::PngEncoder;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image has no pixels")]
    EmptyImage,
}

pub type ExportResult<T> = Result<T, ExportError>;
