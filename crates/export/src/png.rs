//! Lossless PNG encoding

use crate::{ExportError, ExportResult};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// PNG encoder for captured regions
pub struct PngEncoder;

impl PngEncoder {
    /// Encode an RGBA raster into PNG bytes in memory
    pub fn encode(image: &RgbaImage) -> ExportResult<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ExportError::EmptyImage);
        }

        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}
