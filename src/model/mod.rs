//! Model module - Application state and data types
//!
//! - `track`: Track descriptor and the ordered queue
//! - `playlist`: The fixed demonstration playlist
//! - `projection`: Observable playback projection (single writer, many readers)
//! - `types`: UI-only state
//! - `app_model`: Main application model with state management methods

mod app_model;
pub mod playlist;
pub mod projection;
mod track;
mod types;

pub use app_model::{AppModel, NowPlayingInfo};
pub use projection::ProjectionWriter;
pub use track::{Queue, Track};
pub use types::{ControlButton, ServiceStatus, UiState};
