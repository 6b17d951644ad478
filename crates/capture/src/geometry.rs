//! Overlay-local geometry and the mapping into raster space
//!
//! Overlay coordinates are floating point and follow the host windowing
//! convention, which may have the origin at the bottom-left (`YAxis::Up`,
//! AppKit style) or the top-left (`YAxis::Down`, egui/Win32 style). Raster
//! coordinates are always whole pixels with the origin at the top-left and
//! y increasing downward.

use crate::Rect;
use std::ops::{Add, Sub};

/// Point in overlay-local coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Normalized rectangle in overlay-local coordinates.
///
/// `width` and `height` are never negative; `(x, y)` is the corner with the
/// smallest coordinates on both axes, whichever way the y-axis points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LocalRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(Point::new(x, y), Point::new(x + width, y + height))
    }

    /// Build the normalized rectangle spanned by two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the max edges are outside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    /// Shrink by `d` on every side; collapses to zero size instead of inverting
    pub fn inset(&self, d: f64) -> Self {
        let width = (self.width - 2.0 * d).max(0.0);
        let height = (self.height - 2.0 * d).max(0.0);
        Self {
            x: self.x + d,
            y: self.y + d,
            width,
            height,
        }
    }
}

/// Direction of the overlay's vertical axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YAxis {
    /// Origin bottom-left, y grows upward
    Up,
    /// Origin top-left, y grows downward
    #[default]
    Down,
}

/// Size and orientation of the overlay surface covering the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub width: f64,
    pub height: f64,
    pub y_axis: YAxis,
}

impl SurfaceGeometry {
    pub fn new(width: f64, height: f64, y_axis: YAxis) -> Self {
        Self {
            width,
            height,
            y_axis,
        }
    }

    /// Re-express `rect` with a top-left origin and downward y
    pub fn to_top_left(&self, rect: LocalRect) -> LocalRect {
        match self.y_axis {
            YAxis::Down => rect,
            YAxis::Up => LocalRect {
                y: self.height - rect.y - rect.height,
                ..rect
            },
        }
    }
}

/// Map an overlay-local rectangle onto a raster of the whole display.
///
/// The scale per axis is `raster / surface`, so HiDPI displays come out in
/// physical pixels. Edges are rounded independently and clamped to the
/// raster; `None` when nothing of the rectangle is left.
pub fn map_to_raster(
    rect: LocalRect,
    surface: &SurfaceGeometry,
    raster_width: u32,
    raster_height: u32,
) -> Option<Rect> {
    if surface.width <= 0.0 || surface.height <= 0.0 || rect.is_empty() {
        return None;
    }

    let r = surface.to_top_left(rect);
    let sx = raster_width as f64 / surface.width;
    let sy = raster_height as f64 / surface.height;

    let x0 = (r.min_x() * sx).round().clamp(0.0, raster_width as f64);
    let x1 = (r.max_x() * sx).round().clamp(0.0, raster_width as f64);
    let y0 = (r.min_y() * sy).round().clamp(0.0, raster_height as f64);
    let y1 = (r.max_y() * sy).round().clamp(0.0, raster_height as f64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(Rect::new(
        x0 as i32,
        y0 as i32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    ))
}
