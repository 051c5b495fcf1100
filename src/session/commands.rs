//! Capability grants handed to connecting controllers

use std::collections::BTreeSet;

use serde_json::{Map, Value};

pub const SAVE_TO_FAVORITES: &str = "save_to_favorites";

/// Session command identified by its custom action, with its extras
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCommand {
    pub custom_action: String,
    pub args: Map<String, Value>,
}

impl SessionCommand {
    pub fn new(custom_action: impl Into<String>) -> Self {
        Self {
            custom_action: custom_action.into(),
            args: Map::new(),
        }
    }
}

/// Set of session commands a controller may send, keyed by action
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCommands {
    actions: BTreeSet<String>,
}

impl SessionCommands {
    /// Commands every connected controller gets.
    pub fn default_commands() -> Self {
        let mut commands = Self::default();
        commands.add("set_rating");
        commands
    }

    pub fn add(&mut self, action: impl Into<String>) -> &mut Self {
        self.actions.insert(action.into());
        self
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlayerCommand {
    PlayPause,
    Prepare,
    SeekToNext,
    SeekToPrevious,
    SetMediaItems,
    GetCurrentMediaItem,
    Release,
}

impl PlayerCommand {
    pub fn default_commands() -> Vec<PlayerCommand> {
        vec![
            PlayerCommand::PlayPause,
            PlayerCommand::Prepare,
            PlayerCommand::SeekToNext,
            PlayerCommand::SeekToPrevious,
            PlayerCommand::SetMediaItems,
            PlayerCommand::GetCurrentMediaItem,
            PlayerCommand::Release,
        ]
    }
}

/// Custom action button a controller may render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandButton {
    pub display_name: String,
    pub icon: &'static str,
    pub session_command: SessionCommand,
}

/// What a controller identifies itself as when connecting
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerInfo {
    pub package_name: String,
    pub trusted: bool,
}

impl ControllerInfo {
    /// The app's own UI, identified by host name.
    pub fn local() -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            package_name: format!("pocketplay@{}", host),
            trusted: true,
        }
    }

    #[cfg(test)]
    pub fn external(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            trusted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionResult {
    pub available_session_commands: SessionCommands,
    pub available_player_commands: Vec<PlayerCommand>,
    pub custom_layout: Vec<CommandButton>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionResultCode {
    Success,
    NotSupported,
    PermissionDenied,
    SessionDisconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionResult {
    pub code: SessionResultCode,
}

impl SessionResult {
    pub fn new(code: SessionResultCode) -> Self {
        Self { code }
    }

    pub fn is_success(&self) -> bool {
        self.code == SessionResultCode::Success
    }
}
