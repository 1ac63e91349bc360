//! Export artifact naming.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mixcut_host_core::RecorderArtifact;
use serde::Serialize;

/// Container extension for exported files.
pub const EXPORT_EXTENSION: &str = "webm";

/// Collision-resistant export file name for a given instant.
///
/// Millisecond timestamps keep names unique across back-to-back exports of
/// the same source.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("mixcut_enhanced_{}.{EXPORT_EXTENSION}", at.timestamp_millis())
}

/// A finished render, ready to hand to the user.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedExport {
    /// Generated download name.
    pub file_name: String,
    /// The recording the encoder produced.
    pub artifact: RecorderArtifact,
}

impl RenderedExport {
    /// Wrap an encoder artifact with a fresh download name.
    pub fn wrap(artifact: RecorderArtifact) -> Self {
        Self {
            file_name: export_file_name(Utc::now()),
            artifact,
        }
    }

    /// Where the export lands inside an exports directory.
    pub fn path_in(&self, exports_dir: &Path) -> PathBuf {
        exports_dir.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mixcut_host_core::ArtifactLocation;

    #[test]
    fn test_export_name_embeds_millisecond_timestamp() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            export_file_name(at),
            "mixcut_enhanced_1700000000123.webm".to_string()
        );
    }

    #[test]
    fn test_wrap_produces_webm_name() {
        let export = RenderedExport::wrap(RecorderArtifact {
            frames: 30,
            duration_secs: 1.0,
            mime: "video/webm;codecs=vp9,opus".to_string(),
            location: ArtifactLocation::Memory { byte_size: 1024 },
        });
        assert!(export.file_name.starts_with("mixcut_enhanced_"));
        assert!(export.file_name.ends_with(".webm"));
    }

    #[test]
    fn test_path_in_joins_exports_dir() {
        let export = RenderedExport {
            file_name: "mixcut_enhanced_1.webm".to_string(),
            artifact: RecorderArtifact {
                frames: 0,
                duration_secs: 0.0,
                mime: String::new(),
                location: ArtifactLocation::Memory { byte_size: 0 },
            },
        };
        assert_eq!(
            export.path_in(Path::new("/tmp/exports")),
            PathBuf::from("/tmp/exports/mixcut_enhanced_1.webm")
        );
    }
}
