//! Selection state machine: drawing, moving and resizing a rectangle

use capture::{LocalRect, Point, YAxis};

/// Diameter of a corner handle
pub const HANDLE_SIZE: f64 = 10.0;

/// Extra slack around a handle that still counts as a hit
pub const HANDLE_MARGIN: f64 = 5.0;

/// Stroke width of the dashed selection outline
pub const BORDER_WIDTH: f64 = 2.0;

/// Corner handle used to resize the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl DragHandle {
    /// Hit-test order
    pub const ALL: [DragHandle; 4] = [
        DragHandle::TopLeft,
        DragHandle::TopRight,
        DragHandle::BottomLeft,
        DragHandle::BottomRight,
    ];

    pub fn opposite(self) -> DragHandle {
        match self {
            DragHandle::TopLeft => DragHandle::BottomRight,
            DragHandle::TopRight => DragHandle::BottomLeft,
            DragHandle::BottomLeft => DragHandle::TopRight,
            DragHandle::BottomRight => DragHandle::TopLeft,
        }
    }

    /// The corner of `rect` this handle sits on. "Top" is the visually upper
    /// edge, which is the larger y when the axis points up.
    pub fn corner(self, rect: &LocalRect, y_axis: YAxis) -> Point {
        let (top, bottom) = match y_axis {
            YAxis::Up => (rect.max_y(), rect.min_y()),
            YAxis::Down => (rect.min_y(), rect.max_y()),
        };
        match self {
            DragHandle::TopLeft => Point::new(rect.min_x(), top),
            DragHandle::TopRight => Point::new(rect.max_x(), top),
            DragHandle::BottomLeft => Point::new(rect.min_x(), bottom),
            DragHandle::BottomRight => Point::new(rect.max_x(), bottom),
        }
    }
}

/// What a pointer drag currently does
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    Idle,
    /// Rubber-band drawing from `start` to the pointer
    Drawing,
    /// Translating the rectangle; `offset` is the grab point minus the origin
    Moving { offset: Point },
    /// Dragging `handle` while `anchor` (the opposite corner) stays put
    Resizing { handle: DragHandle, anchor: Point },
}

/// Selection rectangle held as two free corners.
///
/// The normalized rectangle is always derived from `start` and `end` on
/// demand; it is never stored.
#[derive(Debug, Clone)]
pub struct Selection {
    start: Option<Point>,
    end: Option<Point>,
    mode: InteractionMode,
    y_axis: YAxis,
    hot_zone: f64,
}

impl Selection {
    pub fn new(y_axis: YAxis) -> Self {
        Self {
            start: None,
            end: None,
            mode: InteractionMode::Idle,
            y_axis,
            hot_zone: HANDLE_SIZE + HANDLE_MARGIN,
        }
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }

    /// Normalized selection, once both corners exist
    pub fn rect(&self) -> Option<LocalRect> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(LocalRect::from_corners(start, end)),
            _ => None,
        }
    }

    /// Which handle, if any, is under `p`.
    ///
    /// Each hot-zone is a square of side `HANDLE_SIZE + HANDLE_MARGIN`
    /// centred on its corner, cut short on the inner side so it never
    /// reaches the middle of the rectangle.
    pub fn handle_at(&self, p: Point) -> Option<DragHandle> {
        let rect = self.rect()?;
        let center = rect.center();
        let reach = self.hot_zone / 2.0;

        DragHandle::ALL.into_iter().find(|handle| {
            let corner = handle.corner(&rect, self.y_axis);
            near_edge(p.x, corner.x, center.x, reach, rect.width / 2.0)
                && near_edge(p.y, corner.y, center.y, reach, rect.height / 2.0)
        })
    }

    pub fn pointer_down(&mut self, p: Point) {
        let Some(rect) = self.rect() else {
            self.begin_new(p);
            return;
        };

        if let Some(handle) = self.handle_at(p) {
            let anchor = handle.opposite().corner(&rect, self.y_axis);
            self.mode = InteractionMode::Resizing { handle, anchor };
        } else if rect.contains(p) {
            self.mode = InteractionMode::Moving {
                offset: p - rect.origin(),
            };
        } else {
            self.begin_new(p);
        }
    }

    /// Returns `true` when the rectangle changed and needs a redraw
    pub fn pointer_move(&mut self, p: Point) -> bool {
        match self.mode {
            InteractionMode::Idle => false,
            InteractionMode::Drawing => {
                if self.start.is_none() {
                    return false;
                }
                self.end = Some(p);
                true
            }
            InteractionMode::Moving { offset } => {
                let Some(rect) = self.rect() else {
                    return false;
                };
                let origin = p - offset;
                self.start = Some(origin);
                self.end = Some(origin + Point::new(rect.width, rect.height));
                true
            }
            InteractionMode::Resizing { anchor, .. } => {
                self.start = Some(anchor);
                self.end = Some(p);
                true
            }
        }
    }

    /// Ends the current gesture and returns the resulting rectangle
    pub fn pointer_up(&mut self) -> Option<LocalRect> {
        self.mode = InteractionMode::Idle;
        self.rect()
    }

    fn begin_new(&mut self, p: Point) {
        self.start = Some(p);
        self.end = None;
        self.mode = InteractionMode::Drawing;
    }
}

/// One axis of the handle hot-zone test. `inner_limit` bounds how far
/// towards the centre the zone may extend (exclusive).
fn near_edge(value: f64, edge: f64, center: f64, reach: f64, inner_limit: f64) -> bool {
    let inward = if edge <= center { 1.0 } else { -1.0 };
    let depth = (value - edge) * inward;
    depth >= -reach && depth <= reach && depth < inner_limit
}
