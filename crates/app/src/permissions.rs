//! Screen recording permission on macOS

use core_graphics::access::ScreenCaptureAccess;
use tracing::{info, warn};

/// Prompt for screen recording access when the process lacks it.
///
/// Returns whether access is granted. A denial is logged rather than fatal:
/// captures then fail with a notice on the overlay.
pub fn ensure_screen_capture_access() -> bool {
    let access = ScreenCaptureAccess;
    request_if_missing(|| access.preflight(), || access.request())
}

fn request_if_missing(preflight: impl FnOnce() -> bool, request: impl FnOnce() -> bool) -> bool {
    if preflight() {
        return true;
    }

    info!("requesting screen capture access");
    let granted = request();
    if !granted {
        warn!("screen capture access not granted; enable it in System Settings > Privacy & Security");
    }
    granted
}
