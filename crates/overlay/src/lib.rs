//! Overlay module for Snapcode
//!
//! Interactive region selection: pointer handling, drag handles, the
//! decoration to draw, and the capture/cancel outcome.

pub mod controller;
pub mod pipeline;
pub mod render;
pub mod selection;

pub use controller::{ActionBar, CaptureRequest, CaptureTicket, OutcomeSink, OverlayController};
pub use pipeline::capture_payload;
pub use render::{Color, DrawCommand, OverlayRenderer, OverlayStyle};
pub use selection::{DragHandle, InteractionMode, Selection, BORDER_WIDTH, HANDLE_MARGIN, HANDLE_SIZE};

use capture::CaptureError;
use export::{ExportError, ImagePayload};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Nothing to capture: draw a larger selection")]
    NothingToCapture,

    #[error("Capture failed: {0}")]
    Capture(CaptureError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] ExportError),

    #[error("A capture is already in progress")]
    CaptureInFlight,

    #[error("Capture result does not match the pending request")]
    StaleCapture,

    #[error("Overlay already finished")]
    Closed,
}

impl From<CaptureError> for OverlayError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::NothingToCapture => OverlayError::NothingToCapture,
            other => OverlayError::Capture(other),
        }
    }
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// How an overlay session ended. Delivered exactly once.
#[derive(Debug, Clone)]
pub enum SelectionOutcome {
    /// User captured a region
    Captured(ImagePayload),
    /// User cancelled
    Cancelled,
}
