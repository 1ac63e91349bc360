//! Media source handles and the registry that owns their lifetimes.
//!
//! A selected file is wrapped in a [`MediaSource`] handle, the analog of an
//! object URL: consumers hold the handle, never the file itself, and the
//! registry revokes the previous handle whenever a new source supersedes it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Maximum accepted source file size in megabytes.
pub const MAX_SOURCE_MB: u64 = 2048;

/// Opaque identifier for a registered media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(pub u64);

/// Descriptor of a selectable media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Filesystem path to the media file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size_bytes: u64,

    /// Mime type, guessed from the file extension.
    pub mime: String,
}

impl SourceDescriptor {
    /// Build a descriptor by probing the filesystem.
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let meta = std::fs::metadata(&path).map_err(|_| SourceError::NotFound {
            path: path.clone(),
        })?;
        if !meta.is_file() {
            return Err(SourceError::NotFound { path });
        }
        let mime = mime_for_path(&path);
        Ok(Self {
            size_bytes: meta.len(),
            path,
            mime,
        })
    }

    /// File size in megabytes.
    pub fn size_mb(&self) -> u64 {
        self.size_bytes / (1024 * 1024)
    }
}

/// A live, registered media source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSource {
    /// Registry handle for this source.
    pub handle: SourceHandle,

    /// The underlying file descriptor.
    pub descriptor: SourceDescriptor,

    /// Registration timestamp (ISO 8601).
    pub registered_at: String,
}

impl MediaSource {
    /// Filesystem path of the source.
    pub fn path(&self) -> &Path {
        &self.descriptor.path
    }
}

/// Owns the active media source and revokes superseded handles.
///
/// At most one source is live at a time: registering a new one revokes the
/// old handle, after which `is_live` returns false for it.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    next_id: u64,
    active: Option<MediaSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new source, revoking any previous one.
    ///
    /// Rejects files above [`MAX_SOURCE_MB`].
    pub fn register(&mut self, descriptor: SourceDescriptor) -> Result<MediaSource, SourceError> {
        if descriptor.size_mb() > MAX_SOURCE_MB {
            return Err(SourceError::TooLarge {
                size_mb: descriptor.size_mb(),
                limit_mb: MAX_SOURCE_MB,
            });
        }

        if let Some(old) = self.active.take() {
            tracing::info!(handle = old.handle.0, "Revoking superseded media source");
        }

        self.next_id += 1;
        let source = MediaSource {
            handle: SourceHandle(self.next_id),
            descriptor,
            registered_at: chrono::Utc::now().to_rfc3339(),
        };
        self.active = Some(source.clone());
        Ok(source)
    }

    /// Explicitly revoke the active source (end of session).
    pub fn revoke(&mut self, handle: SourceHandle) {
        if self.active.as_ref().map(|s| s.handle) == Some(handle) {
            tracing::info!(handle = handle.0, "Revoking media source");
            self.active = None;
        }
    }

    /// Whether a handle still refers to the active source.
    pub fn is_live(&self, handle: SourceHandle) -> bool {
        self.active.as_ref().map(|s| s.handle) == Some(handle)
    }

    /// The currently active source, if any.
    pub fn active(&self) -> Option<&MediaSource> {
        self.active.as_ref()
    }
}

/// Errors raised when registering media sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Source file too large: {size_mb} MB (limit {limit_mb} MB)")]
    TooLarge { size_mb: u64, limit_mb: u64 },
}

/// Guess a mime type from the file extension.
fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
    .to_string()
}
