//! Position polling while playback is active

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::projection::{progress_ratio, ProjectionWriter};

use super::media_controller::MediaController;

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Publishes `position / duration` into the projection every `interval`.
/// At most one polling task runs at a time.
pub struct ProgressPoller {
    controller: MediaController,
    writer: ProjectionWriter,
    interval: Duration,
    task: Option<PollTask>,
}

impl ProgressPoller {
    pub fn new(controller: MediaController, writer: ProjectionWriter, interval: Duration) -> Self {
        Self {
            controller,
            writer,
            interval,
            task: None,
        }
    }

    /// Start polling, replacing any running loop.
    pub fn start(&mut self) {
        self.cancel();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let controller = self.controller.clone();
        let writer = self.writer.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            loop {
                let snapshot = controller.snapshot().await;
                if let Some(progress) = progress_ratio(snapshot.position_ms, snapshot.duration_ms) {
                    writer.set_progress(progress);
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::trace!("Progress polling stopped");
        });

        tracing::trace!(interval_ms = interval.as_millis() as u64, "Progress polling started");
        self.task = Some(PollTask { cancel, handle });
    }

    pub fn ensure_running(&mut self) {
        if !self.is_active() {
            self.start();
        }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}
