//! Controller module - Application logic and event handling
//!
//! - `media_controller`: Async controller handle onto the session
//! - `player_events`: Engine event listener feeding the playback projection
//! - `progress`: Position polling while playing
//! - `playback`: Control surface (play/pause/next/previous/favorite)
//! - `input`: Key event handling

mod input;
mod media_controller;
mod playback;
mod player_events;
mod progress;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::model::{AppModel, ProjectionWriter, ServiceStatus};
use crate::session::{ControllerInfo, SessionBridge};

use media_controller::MediaController;
use player_events::ProjectionBridge;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    bridge: Arc<Mutex<SessionBridge>>,
    controller: Arc<RwLock<Option<MediaController>>>,
    writer: ProjectionWriter,
    connecting: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Cancels the current connection's event listener, including one not spawned yet
    cancel: Arc<Mutex<Option<CancellationToken>>>,
    listener: Arc<Mutex<Option<JoinHandle<()>>>>,
    config: Arc<AppConfig>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        bridge: Arc<Mutex<SessionBridge>>,
        writer: ProjectionWriter,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            model,
            bridge,
            controller: Arc::new(RwLock::new(None)),
            writer,
            connecting: Arc::new(Mutex::new(None)),
            cancel: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
            config,
        }
    }

    /// Begin connecting to the session. Returns immediately; controls stay
    /// inert until the connection resolves.
    pub async fn on_start(&self) {
        let mut connecting = self.connecting.lock().await;
        let pending = connecting.as_ref().is_some_and(|task| !task.is_finished());
        if pending || self.controller.read().await.is_some() {
            tracing::debug!("Controller already connected or connecting");
            return;
        }

        let cancel = CancellationToken::new();
        *self.cancel.lock().await = Some(cancel.clone());

        let future = MediaController::build_async(self.bridge.clone(), ControllerInfo::local());
        let this = self.clone();
        *connecting = Some(tokio::spawn(async move {
            match future.wait().await {
                Ok(controller) => this.on_controller_ready(controller, cancel).await,
                Err(e) => tracing::warn!(error = %e, "Controller connection failed"),
            }
        }));
    }

    async fn on_controller_ready(&self, controller: MediaController, cancel: CancellationToken) {
        let queue = self.model.lock().await.queue();

        if self.config.load_playlist_on_start {
            if let Err(e) = controller.set_media_items(queue.tracks().to_vec(), 0, 0).await {
                tracing::error!(error = %e, "Failed to queue playlist");
            } else if let Err(e) = controller.prepare().await {
                tracing::error!(error = %e, "Failed to prepare playback");
            }
        }

        let handle = ProjectionBridge::new(
            controller.clone(),
            queue,
            self.writer.clone(),
            self.config.poll_interval(),
        )
        .spawn(cancel.clone());
        *self.listener.lock().await = Some(handle);

        let mut slot = self.controller.write().await;
        if cancel.is_cancelled() {
            tracing::debug!("Stopped while connecting, releasing controller");
            controller.release();
            return;
        }

        let model = self.model.lock().await;
        model.set_controller_connected(true).await;
        model
            .set_custom_button_label(controller.custom_layout().first().map(|b| b.display_name.clone()))
            .await;
        *slot = Some(controller);
    }

    /// Stop polling and listening, then release the controller.
    pub async fn on_stop(&self) {
        if let Some(task) = self.connecting.lock().await.take() {
            task.abort();
        }
        if let Some(cancel) = self.cancel.lock().await.take() {
            cancel.cancel();
        }

        if let Some(handle) = self.listener.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::debug!(error = %e, "Event listener ended abnormally");
            }
        }

        if let Some(controller) = self.controller.write().await.take() {
            controller.release();
        }

        let model = self.model.lock().await;
        model.set_controller_connected(false).await;
        model.set_custom_button_label(None).await;
    }

    #[cfg(test)]
    pub async fn is_connected(&self) -> bool {
        self.controller.read().await.is_some()
    }

    pub async fn sync_service_status(&self, status: ServiceStatus) {
        self.model.lock().await.set_service_status(status).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::playback::ControlOutcome;
    use crate::engine::testing::{ScriptedEngine, ScriptedFactory};
    use crate::engine::EngineEvent;
    use crate::model::projection::{self, ProjectionReader};
    use crate::model::{playlist, Queue};
    use crate::session::ResumptionCache;
    use std::time::Duration;

    struct Harness {
        app: AppController,
        engine: Arc<ScriptedEngine>,
        bridge: Arc<Mutex<SessionBridge>>,
        reader: ProjectionReader,
    }

    fn harness(with_session: bool) -> Harness {
        let engine = ScriptedEngine::new();
        let mut bridge = SessionBridge::new(ResumptionCache::in_memory());
        if with_session {
            bridge.initialize(&ScriptedFactory::new(engine.clone()));
        }
        let bridge = Arc::new(Mutex::new(bridge));
        let (writer, reader) = projection::channel();
        let model = AppModel::new(Queue::new(playlist::demo_playlist()).unwrap(), reader.clone());
        let app = AppController::new(
            Arc::new(Mutex::new(model)),
            bridge.clone(),
            writer,
            Arc::new(AppConfig::default()),
        );
        Harness { app, engine, bridge, reader }
    }

    async fn connect(app: &AppController) {
        app.on_start().await;
        let task = app.connecting.lock().await.take().unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn controls_are_unavailable_before_connection() {
        let h = harness(true);
        assert_eq!(h.app.play().await, ControlOutcome::Unavailable);
        assert_eq!(h.app.toggle_playback().await, ControlOutcome::Unavailable);
        assert_eq!(h.app.next_track().await, ControlOutcome::Unavailable);
        assert_eq!(h.app.previous_track().await, ControlOutcome::Unavailable);
        assert_eq!(h.app.save_to_favorites().await, ControlOutcome::Unavailable);
        assert!(h.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn start_queues_playlist_and_prepares() {
        let h = harness(true);
        connect(&h.app).await;

        assert!(h.app.is_connected().await);
        assert_eq!(h.engine.calls(), vec!["set_media_items", "prepare"]);
        assert_eq!(h.engine.items().len(), playlist::DEMO_TRACK_COUNT);
        let resumed = h.bridge.lock().await.on_playback_resumption(&ControllerInfo::local());
        assert_eq!(resumed.items.len(), playlist::DEMO_TRACK_COUNT);

        let model = h.app.model.lock().await;
        assert!(model.get_now_playing().await.controller_connected);
        assert_eq!(model.get_ui_state().await.custom_button_label.as_deref(), Some("Save to favorites"));
    }

    #[tokio::test]
    async fn controls_dispatch_once_connected() {
        let h = harness(true);
        connect(&h.app).await;

        assert_eq!(h.app.toggle_playback().await, ControlOutcome::Dispatched);
        assert_eq!(h.app.next_track().await, ControlOutcome::Dispatched);
        assert_eq!(h.app.save_to_favorites().await, ControlOutcome::Dispatched);
        assert_eq!(h.engine.calls()[2..], ["play", "seek_to_next"]);

        let status = h.app.model.lock().await.get_ui_state().await.status_message;
        assert_eq!(status.as_deref(), Some("Saved to favorites"));
    }

    #[tokio::test]
    async fn missing_session_leaves_controls_inert() {
        let h = harness(false);
        connect(&h.app).await;
        assert!(!h.app.is_connected().await);
        assert_eq!(h.app.play().await, ControlOutcome::Unavailable);
    }

    #[tokio::test]
    async fn listener_drives_projection_until_stop() {
        let h = harness(true);
        connect(&h.app).await;
        let mut reader = h.reader.clone();

        h.engine.emit(EngineEvent::MediaItemTransition {
            media_id: Some("media-4".to_string()),
            reason: crate::engine::TransitionReason::Seek,
        });
        assert_eq!(reader.changed().await.unwrap().current_index, 4);

        h.app.on_stop().await;
        assert!(!h.app.is_connected().await);
        assert_eq!(h.app.play().await, ControlOutcome::Unavailable);

        h.engine.emit(EngineEvent::IsPlayingChanged(true));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!h.reader.snapshot().is_playing);
    }

    #[tokio::test]
    async fn stop_before_connection_resolves_cancels_listener() {
        let h = harness(true);
        let cancel = CancellationToken::new();
        *h.app.cancel.lock().await = Some(cancel.clone());
        h.app.on_stop().await;

        let controller = MediaController::connect(h.bridge.clone(), ControllerInfo::local())
            .await
            .unwrap();
        h.app.on_controller_ready(controller, cancel).await;
        assert!(!h.app.is_connected().await);
        assert!(!h.app.model.lock().await.get_now_playing().await.controller_connected);

        let listener = h.app.listener.lock().await.take().unwrap();
        listener.await.unwrap();

        h.engine.emit(EngineEvent::MediaItemTransition {
            media_id: Some("media-4".to_string()),
            reason: crate::engine::TransitionReason::Seek,
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.reader.snapshot().current_index, 0);
    }

    #[tokio::test]
    async fn stop_then_start_reconnects() {
        let h = harness(true);
        connect(&h.app).await;
        h.app.on_stop().await;
        connect(&h.app).await;
        assert!(h.app.is_connected().await);
    }
}
