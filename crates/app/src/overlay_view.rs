//! Full-screen selection overlay hosted in an egui viewport

use crate::worker::{CaptureWorker, WorkerReply};
use capture::{CaptureError, DisplayInfo, LocalRect, Point, YAxis};
use eframe::egui;
use overlay::{Color, DrawCommand, OutcomeSink, OverlayController, OverlayError};
use tracing::debug;

fn to_color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn to_pos2(p: Point) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

fn to_rect(r: LocalRect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(r.x as f32, r.y as f32),
        egui::vec2(r.width as f32, r.height as f32),
    )
}

/// One overlay invocation: the viewport plus its controller
pub struct OverlaySession {
    controller: OverlayController,
    display: DisplayInfo,
    /// Viewport is withdrawn while the worker grabs the screen
    hidden: bool,
    dragging: bool,
    notice: Option<String>,
}

impl OverlaySession {
    /// Cover `display`, the monitor the capture worker grabs
    pub fn new(display: DisplayInfo, sink: OutcomeSink) -> Self {
        Self {
            controller: OverlayController::new(display.surface(YAxis::Down), sink),
            display,
            hidden: false,
            dragging: false,
            notice: None,
        }
    }

    fn cancel(&mut self) {
        let _ = self.controller.cancel();
    }

    /// Hand a worker reply back to the controller
    pub fn finish_capture(&mut self, reply: WorkerReply) {
        match self.controller.complete_capture(reply.ticket, reply.result) {
            Ok(()) => {}
            Err(OverlayError::Closed | OverlayError::StaleCapture) => {
                debug!("ignoring late capture reply");
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                self.hidden = false;
            }
        }
    }

    fn viewport_builder(&self) -> egui::ViewportBuilder {
        egui::ViewportBuilder::default()
            .with_title("Snapcode selection")
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_resizable(false)
            .with_taskbar(false)
            .with_position([self.display.x as f32, self.display.y as f32])
            .with_inner_size([self.display.width as f32, self.display.height as f32])
    }

    /// Draw the overlay for this frame. Does nothing while hidden or closed.
    pub fn show(&mut self, ctx: &egui::Context, worker: &CaptureWorker) {
        if self.hidden || self.controller.is_closed() {
            return;
        }

        let builder = self.viewport_builder();
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("snapcode-overlay"),
            builder,
            |ctx, _class| self.ui(ctx, worker),
        );
    }

    fn ui(&mut self, ctx: &egui::Context, worker: &CaptureWorker) {
        let (escape, enter, close_requested) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Enter),
                i.viewport().close_requested(),
            )
        });
        if escape || close_requested {
            self.cancel();
            return;
        }

        let size = ctx.screen_rect().size();
        self.controller.set_surface_size(size.x as f64, size.y as f64);

        let panel_frame = egui::Frame::none().fill(egui::Color32::from_black_alpha(40));
        egui::CentralPanel::default().frame(panel_frame).show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            self.handle_pointer(ctx, &response);

            for command in self.controller.draw_commands() {
                paint(&painter, command);
            }

            if let Some(notice) = &self.notice {
                painter.text(
                    egui::pos2(size.x / 2.0, 40.0),
                    egui::Align2::CENTER_CENTER,
                    notice,
                    egui::FontId::proportional(16.0),
                    egui::Color32::WHITE,
                );
            }
        });

        let mut capture_clicked = enter;
        if let Some(bar) = self.controller.action_bar() {
            egui::Area::new(egui::Id::new("snapcode-action-bar"))
                .order(egui::Order::Foreground)
                .fixed_pos(to_pos2(bar.capture.origin()))
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = (bar.cancel.x - bar.capture.max_x()) as f32;
                        let button_size = to_rect(bar.capture).size();
                        if ui.add_sized(button_size, egui::Button::new("Capture")).clicked() {
                            capture_clicked = true;
                        }
                        if ui.add_sized(button_size, egui::Button::new("Cancel")).clicked() {
                            self.cancel();
                        }
                    });
                });
        }

        if capture_clicked && !self.controller.is_closed() {
            self.start_capture(worker);
        }

        if self.controller.take_redraw() {
            ctx.request_repaint();
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let (pressed, released, press_origin, latest) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.press_origin(),
                i.pointer.latest_pos(),
            )
        });

        if pressed && response.contains_pointer() {
            if let Some(origin) = press_origin {
                self.dragging = true;
                self.notice = None;
                self.controller.pointer_down(Point::new(origin.x as f64, origin.y as f64));
            }
        }

        if self.dragging {
            if let Some(pos) = latest {
                self.controller.pointer_move(Point::new(pos.x as f64, pos.y as f64));
            }
        }

        if released && self.dragging {
            self.dragging = false;
            self.controller.pointer_up();
        }
    }

    fn start_capture(&mut self, worker: &CaptureWorker) {
        match self.controller.begin_capture() {
            Ok(request) => {
                if worker.submit(request) {
                    self.hidden = true;
                    self.notice = None;
                } else {
                    let gone = CaptureError::Unavailable("capture worker stopped".into());
                    if let Err(err) = self.controller.complete_capture(request.ticket, Err(gone.into())) {
                        self.notice = Some(err.to_string());
                    }
                }
            }
            Err(err) => {
                debug!("capture not started: {err}");
                self.notice = Some(err.to_string());
            }
        }
    }
}

fn paint(painter: &egui::Painter, command: DrawCommand) {
    match command {
        DrawCommand::DashedRect {
            rect,
            stroke_width,
            dash,
            gap,
            color,
        } => {
            let r = to_rect(rect);
            let outline = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
            painter.extend(egui::Shape::dashed_line(
                &outline,
                egui::Stroke::new(stroke_width as f32, to_color32(color)),
                dash as f32,
                gap as f32,
            ));
        }
        DrawCommand::Handle { center, radius, color } => {
            painter.circle_filled(to_pos2(center), radius as f32, to_color32(color));
        }
    }
}
