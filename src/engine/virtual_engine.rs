//! Clock-driven engine with no audio output
//!
//! Every item is treated as lasting `track_duration`. Position advances with
//! the tokio clock while playing, and a ticker task moves to the next item at
//! end of track, ending playback after the last one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{
    EngineEvent, EngineFactory, EngineSnapshot, EventFlags, PlaybackState, PlayerEngine,
    TransitionReason, EVENT_CHANNEL_CAPACITY, MAX_SEEK_TO_PREVIOUS_POSITION_MS,
};
use crate::error::EngineError;
use crate::model::Track;

const TICK_INTERVAL: Duration = Duration::from_millis(50);

struct Transport {
    items: Vec<Track>,
    index: usize,
    /// Position at the moment the clock was last frozen
    position_ms: u64,
    /// Set while the position is advancing
    running_since: Option<Instant>,
    play_when_ready: bool,
    state: PlaybackState,
    track_duration_ms: u64,
    released: bool,
}

impl Transport {
    fn is_playing(&self) -> bool {
        self.play_when_ready && self.state == PlaybackState::Ready
    }

    fn position(&self) -> u64 {
        let advanced = match self.running_since {
            Some(since) => self.position_ms + since.elapsed().as_millis() as u64,
            None => self.position_ms,
        };
        advanced.min(self.track_duration_ms)
    }

    fn current_id(&self) -> Option<String> {
        self.items.get(self.index).map(|t| t.id.clone())
    }

    fn duration(&self) -> Option<u64> {
        if self.items.is_empty() || self.state == PlaybackState::Idle {
            None
        } else {
            Some(self.track_duration_ms)
        }
    }

    /// Stop the clock at the current position.
    fn freeze(&mut self) {
        self.position_ms = self.position();
        self.running_since = None;
    }

    /// Restart the clock if playback is active, and report an is-playing flip.
    fn resume(&mut self, was_playing: bool, events: &mut Vec<EngineEvent>) {
        let now_playing = self.is_playing();
        if now_playing {
            self.running_since = Some(Instant::now());
        }
        if now_playing != was_playing {
            events.push(EngineEvent::IsPlayingChanged(now_playing));
        }
    }

    fn seek_to_index(&mut self, index: usize, reason: TransitionReason, events: &mut Vec<EngineEvent>) {
        self.index = index;
        self.position_ms = 0;
        if self.state == PlaybackState::Ended {
            self.state = PlaybackState::Ready;
            events.push(EngineEvent::Events(EventFlags::playback_state()));
        }
        events.push(EngineEvent::MediaItemTransition {
            media_id: self.current_id(),
            reason,
        });
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            media_item_count: self.items.len(),
            current_media_id: self.current_id(),
            position_ms: self.position(),
            duration_ms: self.duration(),
            play_when_ready: self.play_when_ready,
            is_playing: self.is_playing(),
            playback_state: self.state,
        }
    }
}

pub struct VirtualEngine {
    transport: Arc<Mutex<Transport>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: CancellationToken,
}

impl VirtualEngine {
    /// Must be called from within a tokio runtime; spawns the end-of-track ticker.
    pub fn new(track_duration: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let transport = Arc::new(Mutex::new(Transport {
            items: Vec::new(),
            index: 0,
            position_ms: 0,
            running_since: None,
            play_when_ready: false,
            state: PlaybackState::Idle,
            track_duration_ms: track_duration.as_millis() as u64,
            released: false,
        }));
        let shutdown = CancellationToken::new();

        tokio::spawn(run_ticker(transport.clone(), events.clone(), shutdown.clone()));

        Self { transport, events, shutdown }
    }

    async fn update<F>(&self, op: &'static str, mutate: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut Transport, &mut Vec<EngineEvent>) + Send,
    {
        let mut events = Vec::new();
        {
            let mut t = self.transport.lock().await;
            if t.released {
                tracing::debug!(op, "Ignoring command on released engine");
                return Err(EngineError::Released);
            }
            let was_playing = t.is_playing();
            t.freeze();
            mutate(&mut t, &mut events);
            t.resume(was_playing, &mut events);
        }
        tracing::trace!(op, events = events.len(), "Virtual engine updated");
        self.emit(events);
        Ok(())
    }

    fn emit(&self, events: Vec<EngineEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

impl Drop for VirtualEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl PlayerEngine for VirtualEngine {
    async fn set_media_items(
        &self,
        items: Vec<Track>,
        start_index: usize,
        start_position_ms: u64,
    ) -> Result<(), EngineError> {
        self.update("set_media_items", move |t, events| {
            let previous_id = t.current_id();
            let previous_state = t.state;
            t.index = start_index.min(items.len().saturating_sub(1));
            t.items = items;
            t.position_ms = start_position_ms.min(t.track_duration_ms);
            if t.state != PlaybackState::Idle {
                t.state = if t.items.is_empty() { PlaybackState::Ended } else { PlaybackState::Ready };
            }
            if t.state != previous_state {
                events.push(EngineEvent::Events(EventFlags::playback_state()));
            }
            let current_id = t.current_id();
            if current_id != previous_id {
                events.push(EngineEvent::MediaItemTransition {
                    media_id: current_id,
                    reason: TransitionReason::PlaylistChanged,
                });
            }
        })
        .await
    }

    async fn prepare(&self) -> Result<(), EngineError> {
        self.update("prepare", |t, events| {
            if t.state == PlaybackState::Idle {
                t.state = if t.items.is_empty() { PlaybackState::Ended } else { PlaybackState::Ready };
                events.push(EngineEvent::Events(EventFlags::playback_state()));
            }
        })
        .await
    }

    async fn play(&self) -> Result<(), EngineError> {
        self.update("play", |t, events| {
            if !t.play_when_ready {
                t.play_when_ready = true;
                events.push(EngineEvent::Events(EventFlags::play_when_ready()));
            }
        })
        .await
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.update("pause", |t, events| {
            if t.play_when_ready {
                t.play_when_ready = false;
                events.push(EngineEvent::Events(EventFlags::play_when_ready()));
            }
        })
        .await
    }

    async fn seek_to_next_media_item(&self) -> Result<(), EngineError> {
        self.update("seek_to_next", |t, events| {
            if t.index + 1 < t.items.len() {
                let next = t.index + 1;
                t.seek_to_index(next, TransitionReason::Seek, events);
            }
        })
        .await
    }

    async fn seek_to_previous_media_item(&self) -> Result<(), EngineError> {
        self.update("seek_to_previous", |t, events| {
            if t.items.is_empty() {
                return;
            }
            if t.position_ms > MAX_SEEK_TO_PREVIOUS_POSITION_MS || t.index == 0 {
                t.position_ms = 0;
            } else {
                let previous = t.index - 1;
                t.seek_to_index(previous, TransitionReason::Seek, events);
            }
        })
        .await
    }

    async fn snapshot(&self) -> EngineSnapshot {
        self.transport.lock().await.snapshot()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    async fn release(&self) {
        let mut events = Vec::new();
        {
            let mut t = self.transport.lock().await;
            if t.released {
                return;
            }
            let was_playing = t.is_playing();
            t.freeze();
            t.released = true;
            t.play_when_ready = false;
            t.state = PlaybackState::Idle;
            t.items.clear();
            t.index = 0;
            t.position_ms = 0;
            if was_playing {
                events.push(EngineEvent::IsPlayingChanged(false));
            }
        }
        self.shutdown.cancel();
        self.emit(events);
        tracing::info!("Virtual engine released");
    }
}

async fn run_ticker(
    transport: Arc<Mutex<Transport>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let mut pending = Vec::new();
        {
            let mut t = transport.lock().await;
            if !t.is_playing() || t.position() < t.track_duration_ms {
                continue;
            }
            t.freeze();
            if t.index + 1 < t.items.len() {
                let next = t.index + 1;
                t.seek_to_index(next, TransitionReason::Auto, &mut pending);
                t.resume(true, &mut pending);
            } else {
                t.state = PlaybackState::Ended;
                pending.push(EngineEvent::Events(EventFlags::playback_state()));
                pending.push(EngineEvent::IsPlayingChanged(false));
            }
        }
        for event in pending {
            let _ = events.send(event);
        }
    }
    tracing::debug!("Virtual engine ticker stopped");
}

pub struct VirtualEngineFactory {
    track_duration: Duration,
}

impl VirtualEngineFactory {
    pub fn new(track_duration: Duration) -> Self {
        Self { track_duration }
    }
}

impl EngineFactory for VirtualEngineFactory {
    fn build(&self) -> Result<Arc<dyn PlayerEngine>, EngineError> {
        if self.track_duration.is_zero() {
            return Err(EngineError::Construction(
                "track duration must be greater than zero".to_string(),
            ));
        }
        Ok(Arc::new(VirtualEngine::new(self.track_duration)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::playlist;

    async fn loaded_engine(count: usize) -> (VirtualEngine, broadcast::Receiver<EngineEvent>) {
        let engine = VirtualEngine::new(Duration::from_secs(10));
        let rx = engine.subscribe();
        engine.set_media_items(playlist::generate_items(count), 0, 0).await.unwrap();
        engine.prepare().await.unwrap();
        (engine, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn play_emits_intent_then_is_playing() {
        let (engine, mut rx) = loaded_engine(2).await;
        drain(&mut rx);

        engine.play().await.unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![
                EngineEvent::Events(EventFlags::play_when_ready()),
                EngineEvent::IsPlayingChanged(true),
            ]
        );
        assert!(engine.snapshot().await.is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn position_advances_only_while_playing() {
        let (engine, _rx) = loaded_engine(1).await;
        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        engine.pause().await.unwrap();
        let paused_at = engine.snapshot().await.position_ms;
        assert!(paused_at >= 2_000);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.snapshot().await.position_ms, paused_at);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_advances_and_ends_after_last_item() {
        let (engine, mut rx) = loaded_engine(2).await;
        engine.play().await.unwrap();
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.current_media_id.as_deref(), Some("media-1"));
        assert!(drain(&mut rx).contains(&EngineEvent::MediaItemTransition {
            media_id: Some("media-1".to_string()),
            reason: TransitionReason::Auto,
        }));

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.playback_state, PlaybackState::Ended);
        assert!(!snapshot.is_playing);
        assert!(drain(&mut rx).contains(&EngineEvent::IsPlayingChanged(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn previous_restarts_when_past_threshold() {
        let (engine, _rx) = loaded_engine(3).await;
        engine.seek_to_next_media_item().await.unwrap();
        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;

        engine.seek_to_previous_media_item().await.unwrap();
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.current_media_id.as_deref(), Some("media-1"));
        assert!(snapshot.position_ms < 100);

        engine.seek_to_previous_media_item().await.unwrap();
        assert_eq!(engine.snapshot().await.current_media_id.as_deref(), Some("media-0"));
    }

    #[tokio::test]
    async fn duration_unknown_until_prepared() {
        let engine = VirtualEngine::new(Duration::from_secs(10));
        engine.set_media_items(playlist::generate_items(1), 0, 0).await.unwrap();
        assert_eq!(engine.snapshot().await.duration_ms, None);
        engine.prepare().await.unwrap();
        assert_eq!(engine.snapshot().await.duration_ms, Some(10_000));
    }

    #[tokio::test]
    async fn release_is_idempotent_and_rejects_commands() {
        let (engine, _rx) = loaded_engine(1).await;
        engine.release().await;
        engine.release().await;
        assert!(matches!(engine.play().await, Err(EngineError::Released)));
        assert_eq!(engine.snapshot().await.media_item_count, 0);
    }

    #[test]
    fn factory_rejects_zero_duration() {
        let factory = VirtualEngineFactory::new(Duration::ZERO);
        assert!(matches!(factory.build(), Err(EngineError::Construction(_))));
    }
}
