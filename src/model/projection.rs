//! Observable playback state consumed by the view
//!
//! The projection is a `watch` channel: the projection bridge holds the only
//! [`ProjectionWriter`], the view and anything else hold [`ProjectionReader`]s.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackProjection {
    pub current_index: usize,
    pub is_playing: bool,
    pub progress: f32,
}

impl Default for PlaybackProjection {
    fn default() -> Self {
        Self {
            current_index: 0,
            is_playing: false,
            progress: 0.0,
        }
    }
}

/// Normalized progress for a position/duration pair.
///
/// Returns `None` when the duration is unknown or zero, so callers skip the
/// publish instead of producing NaN or infinity.
pub fn progress_ratio(position_ms: u64, duration_ms: Option<u64>) -> Option<f32> {
    match duration_ms {
        Some(duration) if duration > 0 => {
            Some((position_ms as f64 / duration as f64).clamp(0.0, 1.0) as f32)
        }
        _ => None,
    }
}

/// Create a projection with default values.
pub fn channel() -> (ProjectionWriter, ProjectionReader) {
    let (tx, rx) = watch::channel(PlaybackProjection::default());
    (ProjectionWriter { tx: Arc::new(tx) }, ProjectionReader { rx })
}

/// Write side. Clones share one channel; only the projection bridge and its
/// polling task hold one.
#[derive(Clone, Debug)]
pub struct ProjectionWriter {
    tx: Arc<watch::Sender<PlaybackProjection>>,
}

impl ProjectionWriter {
    pub fn set_current_index(&self, index: usize) {
        self.tx.send_if_modified(|p| {
            let changed = p.current_index != index;
            p.current_index = index;
            changed
        });
    }

    pub fn set_playing(&self, is_playing: bool) {
        self.tx.send_if_modified(|p| {
            let changed = p.is_playing != is_playing;
            p.is_playing = is_playing;
            changed
        });
    }

    /// Publish progress. Non-finite values are dropped, the rest clamped to [0, 1].
    pub fn set_progress(&self, progress: f32) {
        if !progress.is_finite() {
            tracing::trace!(progress, "Dropping non-finite progress");
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        self.tx.send_if_modified(|p| {
            let changed = p.progress != progress;
            p.progress = progress;
            changed
        });
    }
}

#[derive(Clone, Debug)]
pub struct ProjectionReader {
    rx: watch::Receiver<PlaybackProjection>,
}

impl ProjectionReader {
    pub fn snapshot(&self) -> PlaybackProjection {
        *self.rx.borrow()
    }

    /// Wait for the next change and return the new value.
    #[cfg(test)]
    pub async fn changed(&mut self) -> Option<PlaybackProjection> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_defaults() {
        let (_writer, reader) = channel();
        assert_eq!(reader.snapshot(), PlaybackProjection::default());
    }

    #[test]
    fn ratio_guards_unknown_duration() {
        assert_eq!(progress_ratio(500, Some(1000)), Some(0.5));
        assert_eq!(progress_ratio(500, Some(0)), None);
        assert_eq!(progress_ratio(500, None), None);
        assert_eq!(progress_ratio(5_000, Some(1000)), Some(1.0));
    }

    #[test]
    fn writer_clamps_and_drops_non_finite() {
        let (writer, reader) = channel();
        writer.set_progress(0.25);
        writer.set_progress(f32::NAN);
        assert_eq!(reader.snapshot().progress, 0.25);
        writer.set_progress(f32::INFINITY);
        assert_eq!(reader.snapshot().progress, 0.25);
        writer.set_progress(3.0);
        assert_eq!(reader.snapshot().progress, 1.0);
    }

    #[tokio::test]
    async fn readers_observe_changes() {
        let (writer, mut reader) = channel();
        writer.set_playing(true);
        let seen = reader.changed().await.unwrap();
        assert!(seen.is_playing);
    }
}
