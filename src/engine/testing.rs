//! Scripted engine for tests: state is set directly and events are emitted by hand

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{EngineEvent, EngineFactory, EngineSnapshot, PlayerEngine, EVENT_CHANNEL_CAPACITY};
use crate::error::EngineError;
use crate::model::Track;

#[derive(Default)]
struct Script {
    snapshot: EngineSnapshot,
    items: Vec<Track>,
    calls: Vec<&'static str>,
    released: usize,
}

pub struct ScriptedEngine {
    script: Mutex<Script>,
    events: broadcast::Sender<EngineEvent>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self { script: Mutex::new(Script::default()), events })
    }

    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    pub fn set_position(&self, position_ms: u64) {
        self.script.lock().unwrap().snapshot.position_ms = position_ms;
    }

    pub fn set_duration(&self, duration_ms: Option<u64>) {
        self.script.lock().unwrap().snapshot.duration_ms = duration_ms;
    }

    pub fn set_play_when_ready(&self, play_when_ready: bool) {
        self.script.lock().unwrap().snapshot.play_when_ready = play_when_ready;
    }

    pub fn set_is_playing(&self, is_playing: bool) {
        self.script.lock().unwrap().snapshot.is_playing = is_playing;
    }

    pub fn set_current_media_id(&self, id: Option<&str>) {
        self.script.lock().unwrap().snapshot.current_media_id = id.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn items(&self) -> Vec<Track> {
        self.script.lock().unwrap().items.clone()
    }

    pub fn release_count(&self) -> usize {
        self.script.lock().unwrap().released
    }

    fn record(&self, call: &'static str) -> Result<(), EngineError> {
        let mut script = self.script.lock().unwrap();
        if script.released > 0 {
            return Err(EngineError::Released);
        }
        script.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl PlayerEngine for ScriptedEngine {
    async fn set_media_items(
        &self,
        items: Vec<Track>,
        _start_index: usize,
        start_position_ms: u64,
    ) -> Result<(), EngineError> {
        self.record("set_media_items")?;
        let mut script = self.script.lock().unwrap();
        script.snapshot.media_item_count = items.len();
        script.snapshot.current_media_id = items.first().map(|t| t.id.clone());
        script.snapshot.position_ms = start_position_ms;
        script.items = items;
        Ok(())
    }

    async fn prepare(&self) -> Result<(), EngineError> {
        self.record("prepare")
    }

    async fn play(&self) -> Result<(), EngineError> {
        self.record("play")
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record("pause")
    }

    async fn seek_to_next_media_item(&self) -> Result<(), EngineError> {
        self.record("seek_to_next")
    }

    async fn seek_to_previous_media_item(&self) -> Result<(), EngineError> {
        self.record("seek_to_previous")
    }

    async fn snapshot(&self) -> EngineSnapshot {
        self.script.lock().unwrap().snapshot.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    async fn release(&self) {
        self.script.lock().unwrap().released += 1;
    }
}

/// Hands out one shared [`ScriptedEngine`], or fails every build.
pub struct ScriptedFactory {
    engine: Option<Arc<ScriptedEngine>>,
}

impl ScriptedFactory {
    pub fn new(engine: Arc<ScriptedEngine>) -> Self {
        Self { engine: Some(engine) }
    }

    pub fn failing() -> Self {
        Self { engine: None }
    }
}

impl EngineFactory for ScriptedFactory {
    fn build(&self) -> Result<Arc<dyn PlayerEngine>, EngineError> {
        match &self.engine {
            Some(engine) => Ok(engine.clone() as Arc<dyn PlayerEngine>),
            None => Err(EngineError::Construction("scripted failure".to_string())),
        }
    }
}
