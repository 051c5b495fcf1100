//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared helpers (truncation, popup placement)
//! - `layout`: Top status bar (runner state, notification, session)
//! - `now_playing`: Artwork tile and track metadata
//! - `controls`: Previous / play-pause / next / favorite buttons
//! - `progress`: Progress bar
//! - `overlays`: Help popup and status message

mod controls;
mod layout;
mod now_playing;
mod overlays;
mod progress;
mod utils;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{NowPlayingInfo, ServiceStatus, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, now_playing: &NowPlayingInfo, ui_state: &UiState, service: &ServiceStatus) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Runner state, notification, session
                Constraint::Min(0),    // Artwork + metadata
                Constraint::Length(3), // Control buttons
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_status_bar(frame, chunks[0], service);
        now_playing::render_now_playing(frame, chunks[1], now_playing);
        controls::render_controls(frame, chunks[2], now_playing, ui_state);
        progress::render_progress_bar(frame, chunks[3], now_playing);

        if ui_state.status_message.is_some() {
            overlays::render_status_message(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::playlist;
    use crate::model::projection::PlaybackProjection;
    use crate::service::RunnerState;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn info(index: usize, connected: bool) -> NowPlayingInfo {
        let tracks = playlist::demo_playlist();
        NowPlayingInfo {
            track: tracks[index].clone(),
            projection: PlaybackProjection { current_index: index, is_playing: true, progress: 0.5 },
            queue_len: tracks.len(),
            controller_connected: connected,
        }
    }

    #[test]
    fn renders_metadata_for_current_index() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let status = ServiceStatus {
            runner: RunnerState::Running,
            foreground: true,
            notification: Some("pocketplay".to_string()),
            session_id: Some("session-1760400000000".to_string()),
        };
        terminal
            .draw(|f| AppView::render(f, &info(3, true), &UiState::default(), &status))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Title: Item_3"));
        assert!(text.contains("Artist: David BowieR"));
        assert!(text.contains("Running"));
        assert!(text.contains("session-1760400000000"));
        assert!(text.contains("50%"));
    }

    #[test]
    fn status_bar_without_session() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| AppView::render(f, &info(0, false), &UiState::default(), &ServiceStatus::default()))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Stopped"));
        assert!(text.contains("No session"));
    }

    #[test]
    fn help_popup_lists_keys() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let ui_state = UiState { show_help_popup: true, ..Default::default() };
        terminal
            .draw(|f| AppView::render(f, &info(0, false), &ui_state, &ServiceStatus::default()))
            .unwrap();

        assert!(screen_text(&terminal).contains("Play / Pause"));
    }
}
