//! Snapcode - select a screen region, ask a vision model, copy the answer

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod clipboard;
mod logging;
mod overlay_view;
#[cfg(target_os = "macos")]
mod permissions;
mod settings;
mod state;
mod ui_egui;
mod vision;
mod worker;

use crate::settings::Settings;
use crate::ui_egui::SnapcodeApp;
use crate::worker::CaptureWorker;
use anyhow::{anyhow, Context};
use capture::MonitorDisplay;
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Time for the hidden overlay to leave the composited screen
const CAPTURE_SETTLE: Duration = Duration::from_millis(150);

fn main() -> anyhow::Result<()> {
    // Physical pixel mapping needs per-monitor DPI awareness on Windows
    #[cfg(windows)]
    unsafe {
        use windows::Win32::UI::HiDpi::{
            SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        };
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let settings_path = Settings::default_path();
    let settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();

    logging::init(cfg!(debug_assertions) || settings.debug_logging);
    info!(path = ?settings_path, "starting Snapcode");

    #[cfg(target_os = "macos")]
    permissions::ensure_screen_capture_access();

    let display = MonitorDisplay::primary().context("No display to capture")?;
    let display_info = *display.info();
    let worker = CaptureWorker::spawn(Arc::new(display), CAPTURE_SETTLE);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 220.0])
            .with_min_inner_size([360.0, 180.0])
            .with_title("Snapcode")
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Snapcode",
        native_options,
        Box::new(move |cc| Ok(Box::new(SnapcodeApp::new(cc, settings, settings_path, display_info, worker)))),
    )
    .map_err(|e| anyhow!("UI failed: {e}"))?;

    info!("Snapcode stopped");
    Ok(())
}
