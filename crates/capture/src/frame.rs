//! Captured raster buffer

use crate::Rect;
use image::{imageops, RgbaImage};

/// RGBA8 raster grabbed from the display
#[derive(Debug, Clone)]
pub struct CapturedImage {
    image: RgbaImage,
}

impl CapturedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy out the part of the raster under `rect`, clamped to the bounds
    pub fn crop(&self, rect: &Rect) -> CapturedImage {
        let x = rect.x.max(0) as u32;
        let y = rect.y.max(0) as u32;
        imageops::crop_imm(&self.image, x, y, rect.width, rect.height)
            .to_image()
            .into()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for CapturedImage {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 4x3 raster where each pixel stores its own coordinates
    fn coordinate_raster() -> CapturedImage {
        RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8, y as u8, 0, 255])).into()
    }

    #[test]
    fn crop_copies_the_requested_rows() {
        let cropped = coordinate_raster().crop(&Rect::new(1, 1, 2, 2));
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        assert_eq!(cropped.as_image().get_pixel(0, 0).0, [1, 1, 0, 255]);
        assert_eq!(cropped.as_image().get_pixel(1, 1).0, [2, 2, 0, 255]);
    }

    #[test]
    fn crop_clamps_to_bounds() {
        let cropped = coordinate_raster().crop(&Rect::new(3, 2, 10, 10));
        assert_eq!((cropped.width(), cropped.height()), (1, 1));
        assert_eq!(cropped.as_image().get_pixel(0, 0).0, [3, 2, 0, 255]);

        let outside = coordinate_raster().crop(&Rect::new(9, 9, 2, 2));
        assert_eq!((outside.width(), outside.height()), (0, 0));
    }

    #[test]
    fn negative_origin_starts_at_the_edge() {
        let cropped = coordinate_raster().crop(&Rect::new(-2, -1, 2, 2));
        assert_eq!(cropped.as_image().get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn hands_the_buffer_back() {
        let image = coordinate_raster().into_image();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.get_pixel(3, 2).0, [3, 2, 0, 255]);
    }
}
