//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::model::ControlButton;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Help popup swallows everything except its close keys
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                model.set_should_quit(true).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            KeyCode::Left => {
                model.focus_prev().await;
            }
            KeyCode::Right | KeyCode::Tab => {
                model.focus_next().await;
            }
            KeyCode::Enter => {
                let focused = model.focused_button().await;
                drop(model);
                self.activate(focused).await;
            }
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                drop(model);
                self.save_to_favorites().await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn activate(&self, button: ControlButton) {
        let outcome = match button {
            ControlButton::PlayPause => self.toggle_playback().await,
            ControlButton::Next => self.next_track().await,
            ControlButton::Previous => self.previous_track().await,
            ControlButton::Favorite => self.save_to_favorites().await,
        };
        tracing::trace!(?button, ?outcome, "Button activated");
    }
}
