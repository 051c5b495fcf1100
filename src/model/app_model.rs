//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::projection::{PlaybackProjection, ProjectionReader};
use super::track::{Queue, Track};
use super::types::{ControlButton, ServiceStatus, UiState};

/// Everything the view needs to draw one frame
#[derive(Clone, Debug)]
pub struct NowPlayingInfo {
    pub track: Track,
    pub projection: PlaybackProjection,
    pub queue_len: usize,
    pub controller_connected: bool,
}

pub struct AppModel {
    queue: Arc<Queue>,
    projection: ProjectionReader,
    controller_connected: Arc<Mutex<bool>>,
    service_status: Arc<Mutex<ServiceStatus>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(queue: Queue, projection: ProjectionReader) -> Self {
        Self {
            queue: Arc::new(queue),
            projection,
            controller_connected: Arc::new(Mutex::new(false)),
            service_status: Arc::new(Mutex::new(ServiceStatus::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn queue(&self) -> Arc<Queue> {
        self.queue.clone()
    }

    pub async fn get_now_playing(&self) -> NowPlayingInfo {
        let projection = self.projection.snapshot();
        NowPlayingInfo {
            track: self.queue.track_at(projection.current_index).clone(),
            projection,
            queue_len: self.queue.len(),
            controller_connected: *self.controller_connected.lock().await,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.projection.snapshot().is_playing
    }

    pub async fn set_controller_connected(&self, connected: bool) {
        *self.controller_connected.lock().await = connected;
    }

    pub async fn get_service_status(&self) -> ServiceStatus {
        self.service_status.lock().await.clone()
    }

    pub async fn set_service_status(&self, status: ServiceStatus) {
        *self.service_status.lock().await = status;
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn focus_next(&self) {
        let mut state = self.ui_state.lock().await;
        state.focused = state.focused.next();
    }

    pub async fn focus_prev(&self) {
        let mut state = self.ui_state.lock().await;
        state.focused = state.focused.prev();
    }

    pub async fn focused_button(&self) -> ControlButton {
        self.ui_state.lock().await.focused
    }

    pub async fn set_custom_button_label(&self, label: Option<String>) {
        self.ui_state.lock().await.custom_button_label = label;
    }

    pub async fn set_status(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.status_message = Some(message);
        state.status_timestamp = Some(Instant::now());
    }

    pub async fn auto_clear_old_status(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.status_timestamp {
            if timestamp.elapsed().as_secs() > 3 {
                state.status_message = None;
                state.status_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{playlist, projection};

    #[tokio::test]
    async fn now_playing_follows_projection_index() {
        let (writer, reader) = projection::channel();
        let model = AppModel::new(Queue::new(playlist::generate_items(3)).unwrap(), reader);

        assert_eq!(model.get_now_playing().await.track.id, "media-0");
        writer.set_current_index(2);
        let info = model.get_now_playing().await;
        assert_eq!(info.track.title, "Item_2");
        assert_eq!(info.queue_len, 3);
        assert!(!info.controller_connected);
    }
}
