//! Overlay controller: one selection session from first press to outcome

use crate::pipeline::capture_payload;
use crate::render::{DrawCommand, OverlayRenderer};
use crate::selection::Selection;
use crate::{OverlayError, OverlayResult, SelectionOutcome};
use capture::{LocalRect, Point, RegionRequest, ScreenSource, SurfaceGeometry, YAxis};
use export::ImagePayload;
use tracing::{debug, info, warn};

/// Receives the session outcome. `FnOnce`, so it can only ever fire once.
pub type OutcomeSink = Box<dyn FnOnce(SelectionOutcome) + Send>;

/// Identifies one in-flight capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureTicket(u64);

/// Snapshot handed to whoever performs the capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    pub ticket: CaptureTicket,
    pub region: RegionRequest,
}

/// Capture / Cancel buttons, laid out under the selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionBar {
    pub capture: LocalRect,
    pub cancel: LocalRect,
}

impl ActionBar {
    pub const BUTTON_WIDTH: f64 = 80.0;
    pub const BUTTON_HEIGHT: f64 = 30.0;
    pub const SPACING: f64 = 10.0;

    /// Place both buttons just under the visually lower edge of `rect`
    pub fn below(rect: &LocalRect, y_axis: YAxis) -> Self {
        let y = match y_axis {
            YAxis::Down => rect.max_y() + Self::SPACING,
            YAxis::Up => rect.min_y() - Self::SPACING - Self::BUTTON_HEIGHT,
        };
        let capture = LocalRect::new(rect.min_x(), y, Self::BUTTON_WIDTH, Self::BUTTON_HEIGHT);
        let cancel = LocalRect::new(
            rect.min_x() + Self::BUTTON_WIDTH + Self::SPACING,
            y,
            Self::BUTTON_WIDTH,
            Self::BUTTON_HEIGHT,
        );
        Self { capture, cancel }
    }
}

/// Drives one overlay session.
///
/// Pointer events edit the selection; `capture` or `cancel` end the session
/// by handing exactly one [`SelectionOutcome`] to the sink. Failed captures
/// leave everything as it was so the user can retry.
pub struct OverlayController {
    selection: Selection,
    surface: SurfaceGeometry,
    renderer: OverlayRenderer,
    action_bar: Option<ActionBar>,
    sink: Option<OutcomeSink>,
    pending: Option<CaptureTicket>,
    next_ticket: u64,
    needs_redraw: bool,
}

impl OverlayController {
    pub fn new(surface: SurfaceGeometry, sink: OutcomeSink) -> Self {
        Self {
            selection: Selection::new(surface.y_axis),
            surface,
            renderer: OverlayRenderer::default(),
            action_bar: None,
            sink: Some(sink),
            pending: None,
            next_ticket: 0,
            needs_redraw: false,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_rect(&self) -> Option<LocalRect> {
        self.selection.rect()
    }

    /// Follow the surface as the window settles; the axis convention is fixed
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface.width = width;
        self.surface.height = height;
    }

    /// Buttons to show, if they are currently revealed
    pub fn action_bar(&self) -> Option<ActionBar> {
        self.action_bar
    }

    /// True once an outcome has been delivered
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    pub fn is_capturing(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns and clears the dirty flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        self.renderer.commands(&self.selection)
    }

    fn accepts_input(&self) -> bool {
        self.sink.is_some() && self.pending.is_none()
    }

    pub fn pointer_down(&mut self, p: Point) {
        if !self.accepts_input() {
            return;
        }
        self.selection.pointer_down(p);
        self.action_bar = None;
        self.needs_redraw = true;
        debug!(?p, mode = ?self.selection.mode(), "pointer down");
    }

    pub fn pointer_move(&mut self, p: Point) {
        if !self.accepts_input() {
            return;
        }
        if self.selection.pointer_move(p) {
            self.needs_redraw = true;
        }
    }

    pub fn pointer_up(&mut self) {
        if !self.accepts_input() {
            return;
        }
        if let Some(rect) = self.selection.pointer_up() {
            self.action_bar = Some(ActionBar::below(&rect, self.surface.y_axis));
            debug!(?rect, "selection finalized");
        }
        self.needs_redraw = true;
    }

    /// Capture synchronously on the calling thread.
    pub fn capture(&mut self, source: &dyn ScreenSource) -> OverlayResult<()> {
        let request = self.begin_capture()?;
        let result = capture_payload(source, &request.region);
        self.complete_capture(request.ticket, result)
    }

    /// Snapshot the selection for an out-of-band capture.
    ///
    /// Only one request may be outstanding; pointer input is ignored until
    /// [`complete_capture`](Self::complete_capture) is called with its ticket.
    pub fn begin_capture(&mut self) -> OverlayResult<CaptureRequest> {
        if self.sink.is_none() {
            return Err(OverlayError::Closed);
        }
        if self.pending.is_some() {
            return Err(OverlayError::CaptureInFlight);
        }

        let region = self.region_request().ok_or(OverlayError::NothingToCapture)?;
        let ticket = CaptureTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);

        debug!(?ticket, rect = ?region.rect, "capture started");
        Ok(CaptureRequest { ticket, region })
    }

    /// Deliver the result of a request from [`begin_capture`](Self::begin_capture).
    ///
    /// On success the sink fires with the payload. On failure nothing fires,
    /// the error is returned and the selection is left as it was.
    pub fn complete_capture(
        &mut self,
        ticket: CaptureTicket,
        result: OverlayResult<ImagePayload>,
    ) -> OverlayResult<()> {
        if self.sink.is_none() {
            debug!(?ticket, "dropping capture result after close");
            return Err(OverlayError::Closed);
        }
        if self.pending != Some(ticket) {
            return Err(OverlayError::StaleCapture);
        }
        self.pending = None;

        match result {
            Ok(payload) => {
                info!(bytes = payload.len(), "selection captured");
                self.deliver(SelectionOutcome::Captured(payload));
                Ok(())
            }
            Err(err) => {
                warn!("capture failed: {err}");
                self.needs_redraw = true;
                Err(err)
            }
        }
    }

    /// End the session without a payload. Selection state is untouched.
    pub fn cancel(&mut self) -> OverlayResult<()> {
        if self.sink.is_none() {
            return Err(OverlayError::Closed);
        }
        self.pending = None;
        info!("selection cancelled");
        self.deliver(SelectionOutcome::Cancelled);
        Ok(())
    }

    fn region_request(&self) -> Option<RegionRequest> {
        let rect = self.selection.rect()?;
        let border_width = self.renderer.style().border_width;
        if rect.inset(border_width).is_empty() {
            return None;
        }
        Some(RegionRequest {
            rect,
            surface: self.surface,
            border_width,
        })
    }

    fn deliver(&mut self, outcome: SelectionOutcome) {
        if let Some(sink) = self.sink.take() {
            self.action_bar = None;
            sink(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{CaptureError, CaptureResult, CapturedImage};
    use image::{Rgba, RgbaImage};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Outcomes = Arc<Mutex<Vec<SelectionOutcome>>>;

    fn controller(y_axis: YAxis) -> (OverlayController, Outcomes) {
        let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink_outcomes = outcomes.clone();
        let controller = OverlayController::new(
            SurfaceGeometry::new(400.0, 300.0, y_axis),
            Box::new(move |outcome| sink_outcomes.lock().push(outcome)),
        );
        (controller, outcomes)
    }

    fn draw(ctrl: &mut OverlayController, a: (f64, f64), b: (f64, f64)) {
        ctrl.pointer_down(Point::new(a.0, a.1));
        ctrl.pointer_move(Point::new(b.0, b.1));
        ctrl.pointer_up();
    }

    struct Gray;

    impl ScreenSource for Gray {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            Ok(RgbaImage::from_pixel(400, 300, Rgba([90, 90, 90, 90])).into())
        }
    }

    struct Denied;

    impl ScreenSource for Denied {
        fn grab(&self) -> CaptureResult<CapturedImage> {
            Err(CaptureError::Unavailable("permission denied".into()))
        }
    }

    #[test]
    fn action_bar_appears_only_after_release() {
        let (mut ctrl, _) = controller(YAxis::Down);
        ctrl.pointer_down(Point::new(10.0, 10.0));
        ctrl.pointer_move(Point::new(110.0, 60.0));
        assert_eq!(ctrl.action_bar(), None);

        ctrl.pointer_up();
        let bar = ctrl.action_bar().unwrap();
        assert_eq!(bar.capture, LocalRect::new(10.0, 70.0, 80.0, 30.0));
        assert_eq!(bar.cancel, LocalRect::new(100.0, 70.0, 80.0, 30.0));

        ctrl.pointer_down(Point::new(50.0, 30.0));
        assert_eq!(ctrl.action_bar(), None);
    }

    #[test]
    fn release_without_rect_keeps_buttons_hidden() {
        let (mut ctrl, _) = controller(YAxis::Down);
        ctrl.pointer_down(Point::new(10.0, 10.0));
        ctrl.pointer_up();
        assert_eq!(ctrl.action_bar(), None);
    }

    #[test]
    fn y_up_action_bar_sits_under_the_lower_edge() {
        let (mut ctrl, _) = controller(YAxis::Up);
        draw(&mut ctrl, (10.0, 100.0), (110.0, 200.0));
        let bar = ctrl.action_bar().unwrap();
        assert_eq!(bar.capture.max_y(), 90.0);
    }

    #[test]
    fn moves_mark_the_surface_dirty() {
        let (mut ctrl, _) = controller(YAxis::Down);
        assert!(!ctrl.take_redraw());
        ctrl.pointer_down(Point::new(10.0, 10.0));
        assert!(ctrl.take_redraw());
        assert!(!ctrl.take_redraw());
        ctrl.pointer_move(Point::new(20.0, 20.0));
        assert!(ctrl.take_redraw());
    }

    #[test]
    fn capture_delivers_one_payload() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        draw(&mut ctrl, (10.0, 10.0), (110.0, 60.0));
        ctrl.capture(&Gray).unwrap();

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(&outcomes[0], SelectionOutcome::Captured(p) if p.as_str().starts_with("data:image/png;base64,")));
        assert!(ctrl.is_closed());
        assert!(matches!(ctrl.capture(&Gray), Err(OverlayError::Closed)));
        assert!(matches!(ctrl.cancel(), Err(OverlayError::Closed)));
    }

    #[test]
    fn zero_area_capture_is_a_no_op() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        assert!(matches!(ctrl.capture(&Gray), Err(OverlayError::NothingToCapture)));

        draw(&mut ctrl, (10.0, 10.0), (110.0, 10.0));
        assert!(matches!(ctrl.capture(&Gray), Err(OverlayError::NothingToCapture)));
        assert!(outcomes.lock().is_empty());
        assert!(!ctrl.is_closed());
        assert!(!ctrl.is_capturing());
    }

    #[test]
    fn failed_capture_leaves_state_for_retry() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        draw(&mut ctrl, (10.0, 10.0), (110.0, 60.0));
        let before = ctrl.selection_rect();

        let err = ctrl.capture(&Denied).unwrap_err();
        assert!(matches!(err, OverlayError::Capture(CaptureError::Unavailable(_))));
        assert!(outcomes.lock().is_empty());
        assert_eq!(ctrl.selection_rect(), before);
        assert!(ctrl.action_bar().is_some());

        ctrl.capture(&Gray).unwrap();
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[test]
    fn only_one_capture_in_flight() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        draw(&mut ctrl, (10.0, 10.0), (110.0, 60.0));

        let request = ctrl.begin_capture().unwrap();
        assert!(ctrl.is_capturing());
        assert!(matches!(ctrl.begin_capture(), Err(OverlayError::CaptureInFlight)));

        // Input is frozen while the worker runs
        ctrl.pointer_down(Point::new(300.0, 300.0));
        assert_eq!(ctrl.selection_rect(), Some(request.region.rect));

        let payload = capture_payload(&Gray, &request.region);
        ctrl.complete_capture(request.ticket, payload).unwrap();
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let (mut ctrl, _) = controller(YAxis::Down);
        draw(&mut ctrl, (10.0, 10.0), (110.0, 60.0));

        let first = ctrl.begin_capture().unwrap();
        ctrl.complete_capture(first.ticket, Err(OverlayError::NothingToCapture))
            .unwrap_err();
        let second = ctrl.begin_capture().unwrap();
        assert_ne!(first.ticket, second.ticket);

        let payload = capture_payload(&Gray, &first.region);
        assert!(matches!(
            ctrl.complete_capture(first.ticket, payload),
            Err(OverlayError::StaleCapture)
        ));
        assert!(ctrl.is_capturing());
    }

    #[test]
    fn cancel_before_any_rect_fires_once() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        ctrl.cancel().unwrap();
        assert!(matches!(ctrl.cancel(), Err(OverlayError::Closed)));

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], SelectionOutcome::Cancelled));
    }

    #[test]
    fn cancel_mid_drag_keeps_selection() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        ctrl.pointer_down(Point::new(10.0, 10.0));
        ctrl.pointer_move(Point::new(50.0, 50.0));
        ctrl.cancel().unwrap();
        assert_eq!(ctrl.selection_rect(), Some(LocalRect::new(10.0, 10.0, 40.0, 40.0)));
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[test]
    fn completion_after_cancel_is_dropped() {
        let (mut ctrl, outcomes) = controller(YAxis::Down);
        draw(&mut ctrl, (10.0, 10.0), (110.0, 60.0));

        let request = ctrl.begin_capture().unwrap();
        ctrl.cancel().unwrap();

        let payload = capture_payload(&Gray, &request.region);
        assert!(matches!(
            ctrl.complete_capture(request.ticket, payload),
            Err(OverlayError::Closed)
        ));

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], SelectionOutcome::Cancelled));
    }
}
