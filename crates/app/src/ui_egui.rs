//! Launcher window and host glue, built on egui

use crate::clipboard;
use crate::overlay_view::OverlaySession;
use crate::settings::Settings;
use crate::state::{AppState, StateMachine};
use crate::vision;
use crate::worker::CaptureWorker;
use capture::DisplayInfo;
use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;
use overlay::SelectionOutcome;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Short-lived status message
pub struct Toast {
    pub text: String,
    pub shown_at: Instant,
}

/// UI State shared between threads
pub struct SharedState {
    pub state_machine: StateMachine,
    pub status_text: String,
    pub toast: Option<Toast>,
    /// Failure to show in a modal dialog on the next frame
    pub pending_alert: Option<String>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(),
            status_text: AppState::Idle.display_text().to_string(),
            toast: None,
            pending_alert: None,
        }
    }

    fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Main application using egui
pub struct SnapcodeApp {
    state: Arc<Mutex<SharedState>>,
    settings: Settings,
    settings_path: Option<PathBuf>,
    settings_open: bool,
    display: DisplayInfo,
    worker: CaptureWorker,
    overlay: Option<OverlaySession>,
    outcome_tx: Sender<SelectionOutcome>,
    outcome_rx: Receiver<SelectionOutcome>,
}

impl SnapcodeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: Settings,
        settings_path: Option<PathBuf>,
        display: DisplayInfo,
        worker: CaptureWorker,
    ) -> Self {
        let (outcome_tx, outcome_rx) = unbounded();
        Self {
            state: Arc::new(Mutex::new(SharedState::new())),
            settings,
            settings_path,
            settings_open: false,
            display,
            worker,
            overlay: None,
            outcome_tx,
            outcome_rx,
        }
    }

    fn on_select_click(&mut self) {
        {
            let mut state = self.state.lock();
            if !state.state_machine.start_selecting() {
                return;
            }
            state.status_text = state.state_machine.state().display_text().to_string();
        }

        let tx = self.outcome_tx.clone();
        self.overlay = Some(OverlaySession::new(
            self.display,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        ));
        info!("selection overlay opened");
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            warn!("no config directory, settings not saved");
            return;
        };
        if let Err(e) = self.settings.save(path) {
            error!("failed to save settings: {e:#}");
            self.state.lock().pending_alert = Some(format!("Could not save settings: {e:#}"));
        }
    }

    fn poll_worker(&mut self) {
        while let Some(reply) = self.worker.try_recv() {
            match self.overlay.as_mut() {
                Some(session) => session.finish_capture(reply),
                None => warn!("capture reply without an open overlay"),
            }
        }
    }

    fn poll_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.overlay = None;
            match outcome {
                SelectionOutcome::Cancelled => {
                    let mut state = self.state.lock();
                    state.state_machine.cancel_selecting();
                    state.status_text = "Cancelled".to_string();
                }
                SelectionOutcome::Captured(payload) => {
                    {
                        let mut state = self.state.lock();
                        if !state.state_machine.start_asking() {
                            continue;
                        }
                        state.status_text = state.state_machine.state().display_text().to_string();
                    }

                    let settings = self.settings.clone();
                    let shared = self.state.clone();
                    thread::spawn(move || {
                        let result = vision::ask(&settings, &payload)
                            .and_then(|text| clipboard::copy_text(&text).map(|()| text));

                        let mut state = shared.lock();
                        state.state_machine.finish_asking();
                        match result {
                            Ok(text) => {
                                info!(chars = text.len(), "answer copied to clipboard");
                                state.status_text = AppState::Idle.display_text().to_string();
                                state.show_toast("Copied to clipboard");
                            }
                            Err(e) => {
                                error!("vision request failed: {e:#}");
                                state.status_text = "Request failed".to_string();
                                state.pending_alert = Some(format!("{e:#}"));
                            }
                        }
                    });
                }
            }
        }
    }

    fn show_pending_alert(&self) {
        let alert = self.state.lock().pending_alert.take();
        if let Some(message) = alert {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Snapcode")
                .set_description(message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("API key");
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut self.settings.api_key).password(true))
                    .lost_focus();
                ui.end_row();

                ui.label("Endpoint");
                changed |= ui.text_edit_singleline(&mut self.settings.endpoint).lost_focus();
                ui.end_row();

                ui.label("Model");
                changed |= ui.text_edit_singleline(&mut self.settings.model).lost_focus();
                ui.end_row();

                ui.label("Max tokens");
                let tokens =
                    ui.add(egui::DragValue::new(&mut self.settings.max_tokens).range(1..=32_000));
                changed |= tokens.drag_stopped() || tokens.lost_focus();
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.label("Prompt");
        changed |= ui
            .add(
                egui::TextEdit::multiline(&mut self.settings.prompt)
                    .desired_rows(5)
                    .desired_width(f32::INFINITY),
            )
            .lost_focus();

        ui.horizontal(|ui| {
            if ui.button("Reset prompt").clicked() {
                self.settings.prompt = Settings::default().prompt;
                changed = true;
            }
            changed |= ui
                .checkbox(&mut self.settings.debug_logging, "Debug logging (next start)")
                .changed();
        });

        if changed {
            self.save_settings();
        }
    }
}

impl eframe::App for SnapcodeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.poll_outcomes();

        if let Some(session) = self.overlay.as_mut() {
            session.show(ctx, &self.worker);
        }
        // Outcomes raised while drawing the overlay this frame
        self.poll_outcomes();

        self.show_pending_alert();

        // Clone necessary data to avoid holding lock during UI rendering
        let (app_state, status_text, toast) = {
            let mut state = self.state.lock();
            if state
                .toast
                .as_ref()
                .is_some_and(|t| t.shown_at.elapsed() >= TOAST_DURATION)
            {
                state.toast = None;
            }
            (
                state.state_machine.state().clone(),
                state.status_text.clone(),
                state.toast.as_ref().map(|t| t.text.clone()),
            )
        };

        let mut select_clicked = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(
                    egui::RichText::new("Snapcode")
                        .size(28.0)
                        .color(egui::Color32::from_rgb(51, 51, 51)),
                );
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    let select_btn = egui::Button::new(
                        egui::RichText::new("Selection")
                            .size(16.0)
                            .color(egui::Color32::WHITE),
                    )
                    .fill(if app_state.can_select() {
                        egui::Color32::from_rgb(50, 173, 230)
                    } else {
                        egui::Color32::from_rgb(108, 117, 125)
                    })
                    .min_size(egui::vec2(120.0, 40.0))
                    .rounding(8.0);

                    if ui.add_enabled(app_state.can_select(), select_btn).clicked() {
                        select_clicked = true;
                    }

                    ui.add_space(10.0);
                    ui.toggle_value(&mut self.settings_open, "Settings");

                    ui.add_space(10.0);
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);

                let status_color = match app_state {
                    AppState::Selecting => egui::Color32::from_rgb(255, 136, 0),
                    AppState::Asking => egui::Color32::from_rgb(0, 136, 255),
                    AppState::Idle => egui::Color32::from_rgb(102, 102, 102),
                };
                ui.label(egui::RichText::new(&status_text).size(16.0).color(status_color));

                if let Some(text) = &toast {
                    ui.add_space(8.0);
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgb(40, 167, 69))
                        .inner_margin(8.0)
                        .rounding(6.0)
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
                        });
                }
            });

            if self.settings_open {
                ui.add_space(12.0);
                ui.separator();
                self.settings_panel(ui);
            }
        });

        if select_clicked {
            self.on_select_click();
        }

        if app_state.is_busy() || toast.is_some() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
