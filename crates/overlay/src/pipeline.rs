//! Capture + encode: selection in, payload out

use crate::OverlayResult;
use capture::{capture_region, RegionRequest, ScreenSource};
use export::ImagePayload;
use tracing::debug;

/// Grab the selected region from `source` and encode it as a PNG data URI.
///
/// Blocking; safe to call from a worker thread.
pub fn capture_payload(source: &dyn ScreenSource, request: &RegionRequest) -> OverlayResult<ImagePayload> {
    let image = capture_region(source, request)?;
    let (width, height) = (image.width(), image.height());
    let payload = ImagePayload::png(&image.into_image())?;

    debug!(width, height, bytes = payload.len(), "encoded selection");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OverlayError;
    use capture::{CaptureResult, CapturedImage, LocalRect, SurfaceGeometry, YAxis};
    use image::{GenericImageView, Rgba, RgbaImage};

    struct Flat;

    impl ScreenSource for Flat {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            Ok(RgbaImage::from_pixel(64, 48, Rgba([128, 128, 128, 128])).into())
        }
    }

    fn request(rect: LocalRect) -> RegionRequest {
        RegionRequest {
            rect,
            surface: SurfaceGeometry::new(64.0, 48.0, YAxis::Down),
            border_width: 2.0,
        }
    }

    #[test]
    fn payload_decodes_to_the_inset_size() {
        let payload = capture_payload(&Flat, &request(LocalRect::new(4.0, 4.0, 30.0, 20.0))).unwrap();
        assert!(payload.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(payload.decode().unwrap().dimensions(), (26, 16));
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let err = capture_payload(&Flat, &request(LocalRect::new(4.0, 4.0, 0.0, 20.0))).unwrap_err();
        assert!(matches!(err, OverlayError::NothingToCapture));
    }
}
