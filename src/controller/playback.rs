//! Playback control methods

use std::future::Future;

use crate::error::SessionError;
use crate::session::SAVE_TO_FAVORITES;

use super::media_controller::MediaController;
use super::AppController;

/// Whether a control action reached a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    Dispatched,
    /// No controller connected yet; nothing happened
    Unavailable,
}

impl AppController {
    pub async fn play(&self) -> ControlOutcome {
        self.dispatch("play", |c| async move { c.play().await }).await
    }

    pub async fn pause(&self) -> ControlOutcome {
        self.dispatch("pause", |c| async move { c.pause().await }).await
    }

    pub async fn toggle_playback(&self) -> ControlOutcome {
        let is_playing = self.model.lock().await.is_playing();
        tracing::debug!(is_playing, "Toggling playback");
        if is_playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    pub async fn next_track(&self) -> ControlOutcome {
        self.dispatch("next", |c| async move { c.seek_to_next().await }).await
    }

    pub async fn previous_track(&self) -> ControlOutcome {
        self.dispatch("previous", |c| async move { c.seek_to_previous().await }).await
    }

    /// Send the session's custom layout command.
    pub async fn save_to_favorites(&self) -> ControlOutcome {
        let Some(controller) = self.current_controller().await else {
            return ControlOutcome::Unavailable;
        };

        let command = controller
            .custom_layout()
            .iter()
            .find(|b| b.session_command.custom_action == SAVE_TO_FAVORITES)
            .map(|b| b.session_command.clone());

        let Some(command) = command else {
            tracing::debug!("Session offers no favorites button");
            return ControlOutcome::Dispatched;
        };

        let result = controller.send_custom_command(&command).await;
        let model = self.model.lock().await;
        if result.is_success() {
            tracing::info!("Saved to favorites");
            model.set_status("Saved to favorites".to_string()).await;
        } else {
            tracing::warn!(code = ?result.code, "Save to favorites rejected");
            model.set_status(format!("Save to favorites failed: {:?}", result.code)).await;
        }
        ControlOutcome::Dispatched
    }

    async fn current_controller(&self) -> Option<MediaController> {
        self.controller.read().await.clone()
    }

    /// Run `operation` against the connected controller. Failures are logged
    /// and surfaced as a status message; a missing controller is silent.
    async fn dispatch<F, Fut>(&self, action: &'static str, operation: F) -> ControlOutcome
    where
        F: FnOnce(MediaController) -> Fut,
        Fut: Future<Output = Result<(), SessionError>>,
    {
        let Some(controller) = self.current_controller().await else {
            tracing::trace!(action, "No controller, control ignored");
            return ControlOutcome::Unavailable;
        };

        match operation(controller).await {
            Ok(()) => tracing::debug!(action, "Control dispatched"),
            Err(e) => {
                tracing::error!(action, error = %e, "Control failed");
                self.model.lock().await.set_status(format!("Error: {}", e)).await;
            }
        }
        ControlOutcome::Dispatched
    }
}
