//! UI-only state

use std::time::Instant;

use crate::service::RunnerState;

/// Which control button has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ControlButton {
    #[default]
    PlayPause,
    Next,
    Previous,
    Favorite,
}

impl ControlButton {
    pub fn next(self) -> Self {
        match self {
            ControlButton::PlayPause => ControlButton::Next,
            ControlButton::Next => ControlButton::Previous,
            ControlButton::Previous => ControlButton::Favorite,
            ControlButton::Favorite => ControlButton::PlayPause,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ControlButton::PlayPause => ControlButton::Favorite,
            ControlButton::Next => ControlButton::PlayPause,
            ControlButton::Previous => ControlButton::Next,
            ControlButton::Favorite => ControlButton::Previous,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub focused: ControlButton,
    pub status_message: Option<String>,
    pub status_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    /// Label of the session's custom layout button, once a controller is connected
    pub custom_button_label: Option<String>,
}

/// What the status bar shows about the background runner
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceStatus {
    pub runner: RunnerState,
    pub foreground: bool,
    pub notification: Option<String>,
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_both_ways() {
        let mut b = ControlButton::default();
        for _ in 0..4 {
            b = b.next();
        }
        assert_eq!(b, ControlButton::PlayPause);
        assert_eq!(ControlButton::PlayPause.prev(), ControlButton::Favorite);
    }
}
