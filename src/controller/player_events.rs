//! Engine event listener that keeps the playback projection current

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::EngineEvent;
use crate::model::projection::{progress_ratio, ProjectionWriter};
use crate::model::Queue;

use super::media_controller::MediaController;
use super::progress::ProgressPoller;

/// Maps engine events onto the projection. Owns the progress poller, so
/// polling never outlives the listener.
pub struct ProjectionBridge {
    controller: MediaController,
    queue: Arc<Queue>,
    writer: ProjectionWriter,
    poller: ProgressPoller,
}

impl ProjectionBridge {
    pub fn new(
        controller: MediaController,
        queue: Arc<Queue>,
        writer: ProjectionWriter,
        poll_interval: Duration,
    ) -> Self {
        let poller = ProgressPoller::new(controller.clone(), writer.clone(), poll_interval);
        Self { controller, queue, writer, poller }
    }

    pub async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::MediaItemTransition { media_id: None, .. } => {
                tracing::trace!("Transition without media item ignored");
            }
            EngineEvent::MediaItemTransition { media_id: Some(id), reason } => {
                let index = self.queue.index_of(&id).unwrap_or_else(|| {
                    tracing::debug!(media_id = %id, "Transition to unknown item, showing first");
                    0
                });
                tracing::debug!(media_id = %id, index, ?reason, "Media item transition");
                self.writer.set_current_index(index);
                // The poller is idle while paused, so publish the new item's position once.
                let snapshot = self.controller.snapshot().await;
                self.writer
                    .set_progress(progress_ratio(snapshot.position_ms, snapshot.duration_ms).unwrap_or(0.0));
            }
            EngineEvent::Events(flags) if flags.touches_play_intent() => {
                if self.controller.snapshot().await.play_when_ready {
                    self.poller.start();
                } else {
                    self.poller.cancel();
                }
            }
            EngineEvent::Events(_) => {}
            EngineEvent::IsPlayingChanged(is_playing) => {
                tracing::debug!(is_playing, "Is playing changed");
                self.writer.set_playing(is_playing);
                if is_playing {
                    self.poller.ensure_running();
                } else {
                    self.poller.cancel();
                }
            }
        }
    }

    /// Rebuild the projection from the controller's current state.
    pub async fn resync(&mut self) {
        let snapshot = self.controller.snapshot().await;
        if let Some(id) = &snapshot.current_media_id {
            self.writer.set_current_index(self.queue.index_of(id).unwrap_or(0));
        }
        self.writer.set_playing(snapshot.is_playing);
        if let Some(progress) = progress_ratio(snapshot.position_ms, snapshot.duration_ms) {
            self.writer.set_progress(progress);
        }
        if snapshot.is_playing {
            self.poller.ensure_running();
        } else {
            self.poller.cancel();
        }
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Run the listener until `cancel` fires or the engine goes away.
    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        let mut events = self.controller.subscribe();
        tracing::info!("Starting engine event listener");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Engine event listener shutting down");
                        break;
                    }
                    received = events.recv() => match received {
                        Ok(event) => self.handle_event(event).await,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Engine events lagged, resyncing projection");
                            self.resync().await;
                        }
                        Err(RecvError::Closed) => {
                            tracing::debug!("Engine event stream closed");
                            break;
                        }
                    },
                }
            }
            self.poller.cancel();
        })
    }
}
