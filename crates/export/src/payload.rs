//! Self-describing `data:` URI payload

use crate::{ExportError, ExportResult, PngEncoder};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fmt;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encoded image ready to drop into a JSON `image_url` field
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload(String);

impl ImagePayload {
    /// Encode a raster as PNG and wrap it as a data URI
    pub fn png(image: &RgbaImage) -> ExportResult<Self> {
        let bytes = PngEncoder::encode(image)?;
        Ok(Self::from_png_bytes(&bytes))
    }

    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the URI in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() == PNG_DATA_URI_PREFIX.len()
    }

    pub fn png_bytes(&self) -> ExportResult<Vec<u8>> {
        let body = self.0.get(PNG_DATA_URI_PREFIX.len()..).unwrap_or_default();
        Ok(STANDARD.decode(body)?)
    }

    pub fn decode(&self) -> ExportResult<DynamicImage> {
        let bytes = self.png_bytes()?;
        Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Png)?)
    }
}

// Payloads run to megabytes; keep logs readable.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.0.len())
            .finish()
    }
}
