//! Region capture module for Snapcode
//!
//! Maps an overlay-local selection onto the physical display and grabs
//! exactly those pixels.

pub mod frame;
pub mod geometry;
pub mod source;

pub use frame::CapturedImage;
pub use geometry::{map_to_raster, LocalRect, Point, SurfaceGeometry, YAxis};
pub use source::{capture_region, DisplayInfo, MonitorDisplay, RegionRequest, ScreenSource};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Nothing to capture: selection is empty")]
    NothingToCapture,

    #[error("Screen capture unavailable: {0}")]
    Unavailable(String),

    #[error("No display found")]
    NoDisplay,
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}
