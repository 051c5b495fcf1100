//! Controller handle onto the session's engine
//!
//! Connection is asynchronous: [`MediaController::build_async`] returns a
//! [`ControllerFuture`] that resolves once the session grants access.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::engine::{EngineEvent, EngineSnapshot, PlayerEngine};
use crate::error::SessionError;
use crate::model::Track;
use crate::session::{
    CommandButton, ConnectionResult, ControllerInfo, SessionBridge, SessionCommand, SessionResult,
    SessionResultCode,
};

/// Pending connection. Dropping it aborts the connection attempt.
pub struct ControllerFuture {
    handle: JoinHandle<Result<MediaController, SessionError>>,
}

impl ControllerFuture {
    pub async fn wait(mut self) -> Result<MediaController, SessionError> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Controller connection task ended early");
                Err(SessionError::ConnectionDropped)
            }
        }
    }
}

impl Drop for ControllerFuture {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Clone)]
pub struct MediaController {
    info: ControllerInfo,
    bridge: Arc<Mutex<SessionBridge>>,
    engine: Arc<dyn PlayerEngine>,
    connection: Arc<ConnectionResult>,
    released: Arc<AtomicBool>,
}

impl MediaController {
    pub fn build_async(bridge: Arc<Mutex<SessionBridge>>, info: ControllerInfo) -> ControllerFuture {
        ControllerFuture {
            handle: tokio::spawn(Self::connect(bridge, info)),
        }
    }

    pub async fn connect(
        bridge: Arc<Mutex<SessionBridge>>,
        info: ControllerInfo,
    ) -> Result<Self, SessionError> {
        let (engine, connection) = {
            let guard = bridge.lock().await;
            let session = guard.session().ok_or(SessionError::Unavailable)?;
            (session.engine(), guard.on_connect(&info))
        };
        tracing::info!(
            controller = %info.package_name,
            commands = connection.available_session_commands.len(),
            "Controller connected"
        );
        Ok(Self {
            info,
            bridge,
            engine,
            connection: Arc::new(connection),
            released: Arc::new(AtomicBool::new(false)),
        })
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        if self.released.load(Ordering::Acquire) {
            return Err(SessionError::ConnectionDropped);
        }
        Ok(())
    }

    /// Queue items. They are resolved (and recorded for resumption) by the
    /// session before the engine sees them.
    pub async fn set_media_items(
        &self,
        items: Vec<Track>,
        start_index: usize,
        start_position_ms: u64,
    ) -> Result<(), SessionError> {
        self.ensure_connected()?;
        let resolved = self.bridge.lock().await.on_add_media_items(&self.info, items)?;
        self.engine.set_media_items(resolved, start_index, start_position_ms).await?;
        Ok(())
    }

    pub async fn prepare(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        Ok(self.engine.prepare().await?)
    }

    /// Start playback. With nothing queued, the session's resumption set is
    /// loaded first.
    pub async fn play(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        if self.engine.snapshot().await.media_item_count == 0 {
            let resumption = self.bridge.lock().await.on_playback_resumption(&self.info);
            if !resumption.items.is_empty() {
                tracing::debug!(items = resumption.items.len(), "Resuming from cached items");
                self.engine
                    .set_media_items(
                        resumption.items,
                        resumption.start_index,
                        resumption.start_position_ms,
                    )
                    .await?;
                self.engine.prepare().await?;
            }
        }
        Ok(self.engine.play().await?)
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        Ok(self.engine.pause().await?)
    }

    pub async fn seek_to_next(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        Ok(self.engine.seek_to_next_media_item().await?)
    }

    pub async fn seek_to_previous(&self) -> Result<(), SessionError> {
        self.ensure_connected()?;
        Ok(self.engine.seek_to_previous_media_item().await?)
    }

    pub async fn send_custom_command(&self, command: &SessionCommand) -> SessionResult {
        if self.ensure_connected().is_err() {
            return SessionResult::new(SessionResultCode::SessionDisconnected);
        }
        if !self.connection.available_session_commands.contains(&command.custom_action) {
            tracing::debug!(action = %command.custom_action, "Custom command not granted");
            return SessionResult::new(SessionResultCode::PermissionDenied);
        }
        self.bridge.lock().await.on_custom_command(&self.info, command)
    }

    pub fn custom_layout(&self) -> &[CommandButton] {
        &self.connection.custom_layout
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.engine.subscribe()
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot().await
    }

    /// Disconnect. The engine itself belongs to the session and keeps running.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            tracing::info!(controller = %self.info.package_name, "Controller released");
        }
    }
}
