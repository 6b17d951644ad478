//! Backend-neutral drawing of the selection

use crate::selection::{DragHandle, Selection, BORDER_WIDTH, HANDLE_SIZE};
use capture::{LocalRect, Point};

/// RGBA colour, straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const GRAY: Color = Color::rgb(142, 142, 147);
    pub const CYAN: Color = Color::rgb(50, 173, 230);
}

/// Look of the selection decoration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub border_width: f64,
    pub dash: f64,
    pub gap: f64,
    pub stroke: Color,
    pub handle_size: f64,
    pub handle_fill: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            border_width: BORDER_WIDTH,
            dash: 6.0,
            gap: 3.0,
            stroke: Color::GRAY,
            handle_size: HANDLE_SIZE,
            handle_fill: Color::CYAN,
        }
    }
}

/// One primitive for the host to paint, in overlay-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    DashedRect {
        rect: LocalRect,
        stroke_width: f64,
        dash: f64,
        gap: f64,
        color: Color,
    },
    Handle {
        center: Point,
        radius: f64,
        color: Color,
    },
}

/// Overlay renderer
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Outline first, then the four handles on top. Empty without a rectangle.
    pub fn commands(&self, selection: &Selection) -> Vec<DrawCommand> {
        let Some(rect) = selection.rect() else {
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(5);
        commands.push(DrawCommand::DashedRect {
            rect,
            stroke_width: self.style.border_width,
            dash: self.style.dash,
            gap: self.style.gap,
            color: self.style.stroke,
        });

        for handle in DragHandle::ALL {
            commands.push(DrawCommand::Handle {
                center: self.handle_center(&rect, handle, selection),
                radius: self.style.handle_size / 2.0,
                color: self.style.handle_fill,
            });
        }

        commands
    }

    /// Corner pushed outward so the circle straddles the border evenly
    fn handle_center(&self, rect: &LocalRect, handle: DragHandle, selection: &Selection) -> Point {
        let corner = handle.corner(rect, selection.y_axis());
        let center = rect.center();
        let shift = self.style.handle_size / 2.0 - self.style.border_width;
        let outward = |edge: f64, mid: f64| if edge < mid { -shift } else { shift };
        Point::new(
            corner.x + outward(corner.x, center.x),
            corner.y + outward(corner.y, center.y),
        )
    }
}
