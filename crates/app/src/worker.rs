//! Background capture worker

use capture::ScreenSource;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use export::ImagePayload;
use overlay::{capture_payload, CaptureRequest, CaptureTicket, OverlayResult};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

/// Capture worker commands
enum WorkerCommand {
    Capture(CaptureRequest),
    Shutdown,
}

/// Capture worker result
pub struct WorkerReply {
    pub ticket: CaptureTicket,
    pub result: OverlayResult<ImagePayload>,
}

/// Runs capture + encode off the UI thread, one request at a time
pub struct CaptureWorker {
    cmd_tx: Sender<WorkerCommand>,
    reply_rx: Receiver<WorkerReply>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// `settle` is slept before each grab so a just-hidden overlay is gone
    /// from the composited screen.
    pub fn spawn(source: Arc<dyn ScreenSource>, settle: Duration) -> Self {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (reply_tx, reply_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("capture-worker".into())
            .spawn(move || capture_worker(source, settle, cmd_rx, reply_tx))
            .ok();
        if handle.is_none() {
            error!("failed to spawn capture worker");
        }

        Self {
            cmd_tx,
            reply_rx,
            handle,
        }
    }

    /// Queue a capture. Returns false if the worker is gone.
    pub fn submit(&self, request: CaptureRequest) -> bool {
        self.cmd_tx.send(WorkerCommand::Capture(request)).is_ok()
    }

    pub fn try_recv(&self) -> Option<WorkerReply> {
        self.reply_rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerReply> {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn capture_worker(
    source: Arc<dyn ScreenSource>,
    settle: Duration,
    cmd_rx: Receiver<WorkerCommand>,
    reply_tx: Sender<WorkerReply>,
) {
    debug!("capture worker started");

    while let Ok(command) = cmd_rx.recv() {
        match command {
            WorkerCommand::Capture(request) => {
                thread::sleep(settle);
                let result = capture_payload(source.as_ref(), &request.region);
                let reply = WorkerReply {
                    ticket: request.ticket,
                    result,
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }

    info!("capture worker stopped");
}
