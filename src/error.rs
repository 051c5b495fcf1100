//! Error types shared across the engine, session and service layers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine construction failed: {0}")]
    Construction(String),

    #[error("Engine has been released")]
    Released,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No active session")]
    Unavailable,

    #[error("Media item {0} has no playable URI")]
    UnsupportedItem(String),

    #[error("Controller connection was dropped before it resolved")]
    ConnectionDropped,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForegroundError {
    #[error("Foreground service start not allowed")]
    NotAllowed,

    #[error("Failed to enter foreground: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
