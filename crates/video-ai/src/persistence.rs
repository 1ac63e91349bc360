//! Fire-and-forget persistence of analysis results.
//!
//! The core never waits on this path. A store failure is logged and
//! swallowed; the render and the metadata the user sees are unaffected.

use chrono::{DateTime, Utc};
use mixcut_common::MixcutResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metadata::VideoMetadata;

/// One archived analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub title: String,
    pub content: VideoMetadata,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(metadata: VideoMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            content: metadata,
            created_at: Utc::now(),
        }
    }
}

/// A persistence backend for analysis records.
pub trait AnalysisStore {
    fn save(&self, record: &AnalysisRecord) -> MixcutResult<()>;
}

/// Persist a record without letting a store failure surface.
pub fn record_analysis(store: &dyn AnalysisStore, metadata: VideoMetadata) {
    let record = AnalysisRecord::new(metadata);
    match store.save(&record) {
        Ok(()) => debug!(title = %record.title, "analysis record saved"),
        Err(error) => warn!(%error, title = %record.title, "analysis record dropped"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mixcut_common::MixcutError;

    use super::*;
    use crate::metadata::CopyrightRisk;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: "Clip".into(),
            description: String::new(),
            hashtags: Vec::new(),
            thumbnail_prompt: String::new(),
            copyright_risk: CopyrightRisk::Low,
            copyright_notes: String::new(),
            category: "General".into(),
            virality_score: 50,
            engaging_keywords: Vec::new(),
            recommended_audio_mood: "Upbeat".into(),
        }
    }

    struct MemoryStore {
        saved: Mutex<Vec<AnalysisRecord>>,
        fail: bool,
    }

    impl AnalysisStore for MemoryStore {
        fn save(&self, record: &AnalysisRecord) -> MixcutResult<()> {
            if self.fail {
                return Err(MixcutError::analysis("store offline"));
            }
            self.saved.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[test]
    fn test_record_lands_in_store() {
        let store = MemoryStore {
            saved: Mutex::new(Vec::new()),
            fail: false,
        };
        record_analysis(&store, metadata());
        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Clip");
    }

    #[test]
    fn test_store_failure_does_not_propagate() {
        let store = MemoryStore {
            saved: Mutex::new(Vec::new()),
            fail: true,
        };
        // Must not panic or return an error.
        record_analysis(&store, metadata());
        assert!(store.saved.lock().unwrap().is_empty());
    }
}
