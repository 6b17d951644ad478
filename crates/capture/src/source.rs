//! Display raster sources and region capture

use crate::geometry::{map_to_raster, LocalRect, SurfaceGeometry, YAxis};
use crate::{CaptureError, CaptureResult, CapturedImage};
use tracing::{debug, warn};
use xcap::{Monitor, XCapError};

/// Something that can rasterize the display as currently composited
pub trait ScreenSource: Send + Sync {
    /// Grab the whole display in physical pixels, origin top-left
    fn grab(&self) -> CaptureResult<CapturedImage>;
}

/// Where a monitor sits on the desktop, in logical points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayInfo {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl DisplayInfo {
    /// Build from xcap's figures, which are points on macOS and physical
    /// pixels on the other platforms.
    fn from_native(
        id: u32,
        origin: (i32, i32),
        size: (u32, u32),
        scale_factor: f32,
        native_is_points: bool,
    ) -> Self {
        let scale_factor = if scale_factor > 0.0 { scale_factor as f64 } else { 1.0 };
        let per_point = if native_is_points { 1.0 } else { scale_factor };
        Self {
            id,
            x: origin.0 as f64 / per_point,
            y: origin.1 as f64 / per_point,
            width: size.0 as f64 / per_point,
            height: size.1 as f64 / per_point,
            scale_factor,
        }
    }

    fn describe(monitor: &Monitor) -> Result<Self, XCapError> {
        Ok(Self::from_native(
            monitor.id()?,
            (monitor.x()?, monitor.y()?),
            (monitor.width()?, monitor.height()?),
            monitor.scale_factor()?,
            cfg!(target_os = "macos"),
        ))
    }

    /// The overlay surface that exactly covers this monitor
    pub fn surface(&self, y_axis: YAxis) -> SurfaceGeometry {
        SurfaceGeometry::new(self.width, self.height, y_axis)
    }
}

fn unavailable(err: XCapError) -> CaptureError {
    CaptureError::Unavailable(err.to_string())
}

/// One monitor, grabbed through xcap.
///
/// The overlay is sized and placed from [`info`](Self::info), so the raster
/// this source returns is the one under the selection.
#[derive(Debug, Clone, Copy)]
pub struct MonitorDisplay {
    info: DisplayInfo,
}

impl MonitorDisplay {
    /// The primary monitor, or the first one when none is flagged primary
    pub fn primary() -> CaptureResult<Self> {
        let monitors = Monitor::all().map_err(unavailable)?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .ok_or(CaptureError::NoDisplay)?;

        let info = DisplayInfo::describe(monitor).map_err(unavailable)?;
        debug!(?info, "capturing from monitor");
        Ok(Self { info })
    }

    pub fn info(&self) -> &DisplayInfo {
        &self.info
    }

    fn monitor(&self) -> CaptureResult<Monitor> {
        Monitor::all()
            .map_err(unavailable)?
            .into_iter()
            .find(|m| m.id().ok() == Some(self.info.id))
            .ok_or(CaptureError::NoDisplay)
    }
}

impl ScreenSource for MonitorDisplay {
    fn grab(&self) -> CaptureResult<CapturedImage> {
        let image = self.monitor()?.capture_image().map_err(|e| {
            warn!("display capture failed: {e}");
            unavailable(e)
        })?;
        Ok(image.into())
    }
}

/// A finalized selection ready to be captured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRequest {
    /// Normalized selection in overlay-local coordinates
    pub rect: LocalRect,
    /// The overlay surface the selection was drawn on
    pub surface: SurfaceGeometry,
    /// Stroke width of the drawn outline, excluded from the capture
    pub border_width: f64,
}

/// Capture the pixels inside the selection, excluding its outline.
pub fn capture_region(
    source: &dyn ScreenSource,
    request: &RegionRequest,
) -> CaptureResult<CapturedImage> {
    let inner = request.rect.inset(request.border_width);
    if inner.is_empty() {
        return Err(CaptureError::NothingToCapture);
    }

    let raster = source.grab()?;
    let region = map_to_raster(inner, &request.surface, raster.width(), raster.height())
        .ok_or(CaptureError::NothingToCapture)?;

    debug!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "cropping display raster"
    );

    Ok(raster.crop(&region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;
    use image::{Rgba, RgbaImage};

    /// Raster whose top 10 rows are red and the rest blue
    struct BandedDisplay {
        width: u32,
        height: u32,
    }

    impl ScreenSource for BandedDisplay {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            let image = RgbaImage::from_fn(self.width, self.height, |_, y| {
                if y < 10 {
                    Rgba([255, 0, 0, 255])
                } else {
                    Rgba([0, 0, 255, 255])
                }
            });
            Ok(image.into())
        }
    }

    /// Stand-in for a monitor: its raster is derived from the same record
    /// the overlay is sized from. Pixels encode their own coordinates.
    struct RecordedMonitor(DisplayInfo);

    impl ScreenSource for RecordedMonitor {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            let info = self.0;
            let width = (info.width * info.scale_factor).round() as u32;
            let height = (info.height * info.scale_factor).round() as u32;
            let image = RgbaImage::from_fn(width, height, |x, y| {
                Rgba([(x % 256) as u8, (y % 256) as u8, (x / 256) as u8, (y / 256) as u8])
            });
            Ok(image.into())
        }
    }

    struct DeniedDisplay;

    impl ScreenSource for DeniedDisplay {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            Err(CaptureError::Unavailable("screen recording not permitted".into()))
        }
    }

    fn pixel(image: &CapturedImage, x: u32, y: u32) -> [u8; 4] {
        image.as_image().get_pixel(x, y).0
    }

    fn request(rect: LocalRect, y_axis: YAxis) -> RegionRequest {
        RegionRequest {
            rect,
            surface: SurfaceGeometry::new(200.0, 100.0, y_axis),
            border_width: 2.0,
        }
    }

    #[test]
    fn capture_excludes_the_border() {
        let display = BandedDisplay {
            width: 200,
            height: 100,
        };
        let image = capture_region(
            &display,
            &request(LocalRect::new(20.0, 30.0, 50.0, 40.0), YAxis::Down),
        )
        .unwrap();
        assert_eq!((image.width(), image.height()), (46, 36));
    }

    #[test]
    fn y_up_selection_near_the_top_reads_the_top_rows() {
        let display = BandedDisplay {
            width: 200,
            height: 100,
        };
        // y-up: 92..100 after the 2px inset, i.e. raster rows 0..8
        let image = capture_region(
            &display,
            &request(LocalRect::new(0.0, 90.0, 20.0, 12.0), YAxis::Up),
        )
        .unwrap();
        assert_eq!(image.height(), 8);
        assert_eq!(pixel(&image, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&image, 0, 7), [255, 0, 0, 255]);
    }

    #[test]
    fn y_down_selection_near_the_top_reads_the_top_rows() {
        let display = BandedDisplay {
            width: 200,
            height: 100,
        };
        let image = capture_region(
            &display,
            &request(LocalRect::new(0.0, 0.0, 20.0, 12.0), YAxis::Down),
        )
        .unwrap();
        assert_eq!(pixel(&image, 0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn selection_thinner_than_the_border_is_nothing() {
        let display = BandedDisplay {
            width: 200,
            height: 100,
        };
        let err = capture_region(
            &display,
            &request(LocalRect::new(10.0, 10.0, 4.0, 50.0), YAxis::Down),
        )
        .unwrap_err();
        assert!(matches!(err, CaptureError::NothingToCapture));
    }

    #[test]
    fn source_failure_is_reported() {
        let err = capture_region(
            &DeniedDisplay,
            &request(LocalRect::new(10.0, 10.0, 40.0, 40.0), YAxis::Down),
        )
        .unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(_)));
    }

    #[test]
    fn native_pixels_are_converted_to_points() {
        let info = DisplayInfo::from_native(7, (3840, 0), (3840, 2160), 1.5, false);
        assert_eq!((info.x, info.y), (2560.0, 0.0));
        assert_eq!((info.width, info.height), (2560.0, 1440.0));

        let mac = DisplayInfo::from_native(1, (0, 0), (1440, 900), 2.0, true);
        assert_eq!((mac.width, mac.height, mac.scale_factor), (1440.0, 900.0, 2.0));

        let odd = DisplayInfo::from_native(1, (0, 0), (800, 600), 0.0, false);
        assert_eq!((odd.width, odd.scale_factor), (800.0, 1.0));
    }

    #[test]
    fn overlay_and_raster_from_one_monitor_line_up() {
        let info = DisplayInfo::from_native(2, (0, 0), (2560, 1440), 1.0, false);
        let surface = info.surface(YAxis::Down);
        let raster = RecordedMonitor(info).grab().unwrap();

        let rect = LocalRect::new(1000.0, 500.0, 200.0, 100.0);
        assert_eq!(
            map_to_raster(rect, &surface, raster.width(), raster.height()),
            Some(Rect::new(1000, 500, 200, 100))
        );

        let image = capture_region(
            &RecordedMonitor(info),
            &RegionRequest {
                rect,
                surface,
                border_width: 2.0,
            },
        )
        .unwrap();
        assert_eq!((image.width(), image.height()), (196, 96));
        assert_eq!(pixel(&image, 0, 0), [(1002 % 256) as u8, (502 % 256) as u8, 3, 1]);
    }

    #[test]
    fn hidpi_monitor_record_scales_to_physical_pixels() {
        let info = DisplayInfo::from_native(3, (0, 0), (2880, 1800), 2.0, false);
        assert_eq!((info.width, info.height), (1440.0, 900.0));

        let image = capture_region(
            &RecordedMonitor(info),
            &RegionRequest {
                rect: LocalRect::new(100.0, 50.0, 104.0, 54.0),
                surface: info.surface(YAxis::Down),
                border_width: 2.0,
            },
        )
        .unwrap();
        assert_eq!((image.width(), image.height()), (200, 100));
        assert_eq!(pixel(&image, 0, 0), [204, 104, 0, 0]);
    }
}
