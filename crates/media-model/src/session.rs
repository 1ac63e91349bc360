//! Edit session persistence.
//!
//! A session file (`session.json`) captures one complete edit description:
//! the selected source, its trim window, playback settings, and the chosen
//! music track. A render can be described once and re-run from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::music::MusicTrack;
use crate::settings::PlaybackSettings;
use crate::trim::TrimRange;

/// Serialized edit session (`session.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSession {
    /// Schema version.
    pub version: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Path to the source media file.
    pub source_path: PathBuf,

    /// Trim window over the source.
    pub trim: TrimRange,

    /// Playback and enhancement settings.
    pub settings: PlaybackSettings,

    /// Selected music track id from the catalog, `None` for no music.
    #[serde(default)]
    pub music_track_id: Option<String>,
}

impl EditSession {
    /// Fresh session for a newly selected source: full trim window and
    /// default settings, no music.
    pub fn for_source(source_path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            created_at: now.clone(),
            modified_at: now,
            source_path: source_path.into(),
            trim: TrimRange::full(duration_secs),
            settings: PlaybackSettings::default(),
            music_track_id: None,
        }
    }

    /// Load a session file, validating the trim invariant.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();

        let json = std::fs::read_to_string(&path).map_err(|e| SessionError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let session: EditSession =
            serde_json::from_str(&json).map_err(|e| SessionError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        if !session.trim.is_valid() {
            return Err(SessionError::ValidationError {
                message: format!(
                    "trim window {}..{} is invalid for duration {}",
                    session.trim.start(),
                    session.trim.end(),
                    session.trim.duration()
                ),
            });
        }

        Ok(session)
    }

    /// Save the session, bumping the modified timestamp.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref().to_path_buf();
        self.modified_at = chrono::Utc::now().to_rfc3339();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| SessionError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        std::fs::write(&path, json).map_err(|e| SessionError::IoError { path, source: e })
    }

    /// Resolve the selected track against a catalog.
    pub fn selected_track<'a>(&self, catalog: &'a [MusicTrack]) -> Option<&'a MusicTrack> {
        let id = self.music_track_id.as_deref()?;
        crate::music::find_by_id(catalog, id)
    }
}

/// Errors that can occur when working with session files.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid session: {message}")]
    ValidationError { message: String },
}
