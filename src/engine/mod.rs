//! Player engine capability interface
//!
//! The engine decodes and renders audio and reports transport state. This
//! crate never does either itself: the session and projection layers program
//! against [`PlayerEngine`], and [`VirtualEngineFactory`] builds a clock-driven
//! transport with no audio output for running the app end to end.

mod virtual_engine;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::EngineError;
use crate::model::Track;

pub use virtual_engine::VirtualEngineFactory;

/// How deep an engine's event buffer is before slow listeners start lagging
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Past this position "previous" restarts the current item instead of moving back.
pub const MAX_SEEK_TO_PREVIOUS_POSITION_MS: u64 = 3_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Ready,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionReason {
    Auto,
    Seek,
    PlaylistChanged,
}

/// Which state groups changed in one engine update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventFlags {
    pub playback_state_changed: bool,
    pub play_when_ready_changed: bool,
}

impl EventFlags {
    pub fn playback_state() -> Self {
        Self { playback_state_changed: true, ..Default::default() }
    }

    pub fn play_when_ready() -> Self {
        Self { play_when_ready_changed: true, ..Default::default() }
    }

    pub fn touches_play_intent(&self) -> bool {
        self.playback_state_changed || self.play_when_ready_changed
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    MediaItemTransition {
        media_id: Option<String>,
        reason: TransitionReason,
    },
    Events(EventFlags),
    IsPlayingChanged(bool),
}

/// Point-in-time view of the engine transport
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub media_item_count: usize,
    pub current_media_id: Option<String>,
    pub position_ms: u64,
    /// `None` while no media is loaded
    pub duration_ms: Option<u64>,
    pub play_when_ready: bool,
    pub is_playing: bool,
    pub playback_state: PlaybackState,
}

#[async_trait]
pub trait PlayerEngine: Send + Sync {
    async fn set_media_items(
        &self,
        items: Vec<Track>,
        start_index: usize,
        start_position_ms: u64,
    ) -> Result<(), EngineError>;

    async fn prepare(&self) -> Result<(), EngineError>;

    async fn play(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    async fn seek_to_next_media_item(&self) -> Result<(), EngineError>;

    async fn seek_to_previous_media_item(&self) -> Result<(), EngineError>;

    async fn snapshot(&self) -> EngineSnapshot;

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;

    /// Release all resources. Later calls are no-ops.
    async fn release(&self);
}

/// Builds the engine a session wraps
pub trait EngineFactory: Send + Sync {
    fn build(&self) -> Result<Arc<dyn PlayerEngine>, EngineError>;
}
