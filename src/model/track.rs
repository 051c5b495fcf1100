//! Playable track descriptors and the ordered queue built from them

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A playable item: an id plus the metadata the UI shows for it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub artist: String,
    pub artwork_uri: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        artwork_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_uri: artwork_uri.into(),
        }
    }

    pub fn has_playable_uri(&self) -> bool {
        !self.uri.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue must contain at least one track")]
    Empty,

    #[error("Duplicate track id in queue: {0}")]
    DuplicateId(String),
}

/// Ordered, non-empty list of tracks with unique ids
#[derive(Clone, Debug)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    pub fn new(tracks: Vec<Track>) -> Result<Self, QueueError> {
        if tracks.is_empty() {
            return Err(QueueError::Empty);
        }
        let mut seen = HashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(track.id.as_str()) {
                return Err(QueueError::DuplicateId(track.id.clone()));
            }
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Position of the first track with this id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Track at `index`, or the first track when out of range.
    pub fn track_at(&self, index: usize) -> &Track {
        // Non-empty is checked in `new`.
        self.tracks.get(index).unwrap_or(&self.tracks[0])
    }
}
