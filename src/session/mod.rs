//! Session bridge: owns the engine and mediates controller access to it
//!
//! - `commands`: Capability grants, custom commands and result codes
//! - `resumption`: The append-only resumption cache

mod commands;
mod resumption;

use std::sync::Arc;

use crate::engine::{EngineFactory, PlayerEngine};
use crate::error::SessionError;
use crate::model::Track;

pub use commands::{
    CommandButton, ConnectionResult, ControllerInfo, PlayerCommand, SessionCommand,
    SessionCommands, SessionResult, SessionResultCode, SAVE_TO_FAVORITES,
};
pub use resumption::ResumptionCache;

/// Single engine handle exposed to controllers
#[derive(Clone)]
pub struct Session {
    id: String,
    engine: Arc<dyn PlayerEngine>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn engine(&self) -> Arc<dyn PlayerEngine> {
        self.engine.clone()
    }
}

/// Items to resume with and where to start
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItemsWithStartPosition {
    pub items: Vec<Track>,
    pub start_index: usize,
    pub start_position_ms: u64,
}

pub struct SessionBridge {
    session: Option<Session>,
    resumption: ResumptionCache,
}

impl SessionBridge {
    pub fn new(resumption: ResumptionCache) -> Self {
        Self { session: None, resumption }
    }

    /// Build the engine and wrap it in a session. Returns whether a session is
    /// available afterwards; construction failures are logged, not retried.
    pub fn initialize(&mut self, factory: &dyn EngineFactory) -> bool {
        if let Some(session) = &self.session {
            tracing::warn!(session_id = %session.id, "Session already initialized");
            return true;
        }

        match factory.build() {
            Ok(engine) => {
                let id = format!("session-{}", chrono::Utc::now().timestamp_millis());
                tracing::info!(session_id = %id, "Media session created");
                self.session = Some(Session { id, engine });
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Engine construction failed, session unavailable");
                false
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Every controller gets the same grant: default commands plus the
    /// favorites command and its button.
    pub fn on_connect(&self, controller: &ControllerInfo) -> ConnectionResult {
        tracing::debug!(
            controller = %controller.package_name,
            trusted = controller.trusted,
            "Controller connecting"
        );

        let mut session_commands = SessionCommands::default_commands();
        session_commands.add(SAVE_TO_FAVORITES);

        let favorite_button = CommandButton {
            display_name: "Save to favorites".to_string(),
            icon: "♥",
            session_command: SessionCommand::new(SAVE_TO_FAVORITES),
        };

        ConnectionResult {
            available_session_commands: session_commands,
            available_player_commands: PlayerCommand::default_commands(),
            custom_layout: vec![favorite_button],
        }
    }

    /// Record the items for resumption, then resolve them. Items without a
    /// playable URI fail the whole batch (they stay recorded).
    pub fn on_add_media_items(
        &mut self,
        controller: &ControllerInfo,
        items: Vec<Track>,
    ) -> Result<Vec<Track>, SessionError> {
        self.resumption.extend(&items);
        tracing::debug!(
            controller = %controller.package_name,
            added = items.len(),
            cached = self.resumption.len(),
            "Media items added"
        );

        if let Some(unplayable) = items.iter().find(|t| !t.has_playable_uri()) {
            return Err(SessionError::UnsupportedItem(unplayable.id.clone()));
        }
        Ok(items)
    }

    pub fn on_custom_command(
        &self,
        controller: &ControllerInfo,
        command: &SessionCommand,
    ) -> SessionResult {
        if command.custom_action == SAVE_TO_FAVORITES {
            tracing::info!(controller = %controller.package_name, "Save to favorites requested");
            return SessionResult::new(SessionResultCode::Success);
        }
        tracing::debug!(action = %command.custom_action, "Unsupported custom command");
        SessionResult::new(SessionResultCode::NotSupported)
    }

    /// Everything ever queued, from the first item, at position zero.
    pub fn on_playback_resumption(&self, controller: &ControllerInfo) -> MediaItemsWithStartPosition {
        tracing::info!(
            controller = %controller.package_name,
            items = self.resumption.len(),
            "Playback resumption requested"
        );
        MediaItemsWithStartPosition {
            items: self.resumption.items().to_vec(),
            start_index: 0,
            start_position_ms: 0,
        }
    }

    pub async fn release(&mut self) {
        if let Some(session) = self.session.take() {
            session.engine.release().await;
            tracing::info!(session_id = %session.id, "Media session released");
        }
    }
}
