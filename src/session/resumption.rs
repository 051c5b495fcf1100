//! Append-only record of every item queued through the session
//!
//! Answers playback-resumption queries, including after a restart when a
//! backing file is configured. Nothing is ever removed, so the record grows
//! for the lifetime of the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::model::Track;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    items: Vec<Track>,
}

#[derive(Default)]
pub struct ResumptionCache {
    items: Vec<Track>,
    path: Option<PathBuf>,
}

impl ResumptionCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache backed by `path`. An existing snapshot there is loaded; an
    /// unreadable one is logged and ignored.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match Self::load_from_disk(&path) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load resumption cache");
                Vec::new()
            }
        };
        tracing::debug!(path = %path.display(), items = items.len(), "Resumption cache opened");
        Self { items, path: Some(path) }
    }

    fn load_from_disk(path: &Path) -> Result<Vec<Track>, CacheError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(snapshot.items)
    }

    fn save_to_disk(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let snapshot = Snapshot {
            saved_at: Utc::now(),
            items: self.items.clone(),
        };
        std::fs::write(path, serde_json::to_string(&snapshot)?)?;
        Ok(())
    }

    /// Append items. A failed save leaves the in-memory record intact.
    pub fn extend(&mut self, items: &[Track]) {
        self.items.extend_from_slice(items);
        if let Some(path) = &self.path {
            if let Err(e) = self.save_to_disk(path) {
                tracing::warn!(path = %path.display(), error = %e, "Could not persist resumption cache");
            }
        }
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
