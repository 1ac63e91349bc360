//! Metadata analysis entry points.
//!
//! [`MetadataAnalyzer`] is the seam a remote backend plugs into. The
//! built-in [`HeuristicAnalyzer`] is fully local and deterministic: the
//! same bytes always produce the same metadata, which keeps mood-driven
//! track selection working offline and testable.

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_media_model::Mood;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::metadata::{CopyrightRisk, VideoMetadata};

/// Files above this size skip remote analysis entirely; they stay fully
/// renderable, just without generated metadata.
pub const ANALYSIS_UPLOAD_LIMIT_MB: u64 = 500;

/// Whether a source of this size may be submitted for analysis.
pub fn analysis_eligible(byte_size: u64) -> bool {
    byte_size <= ANALYSIS_UPLOAD_LIMIT_MB * 1024 * 1024
}

/// An analysis backend: raw video bytes and a mime type in, structured
/// metadata out.
pub trait MetadataAnalyzer {
    fn analyze(&self, video: &[u8], mime_type: &str) -> MixcutResult<VideoMetadata>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Local stand-in analyzer. Derives every field from a byte fingerprint
/// of the payload, so results are stable across runs and machines.
pub struct HeuristicAnalyzer {
    config: AnalysisConfig,
}

impl HeuristicAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Cheap order-sensitive fingerprint over up to 256 sampled bytes.
    fn fingerprint(video: &[u8]) -> u64 {
        let step = (video.len() / 256).max(1);
        video
            .iter()
            .step_by(step)
            .fold(video.len() as u64, |acc, &byte| {
                acc.wrapping_mul(31).wrapping_add(u64::from(byte))
            })
    }
}

impl MetadataAnalyzer for HeuristicAnalyzer {
    fn analyze(&self, video: &[u8], mime_type: &str) -> MixcutResult<VideoMetadata> {
        if video.is_empty() {
            return Err(MixcutError::analysis("cannot analyze an empty payload"));
        }
        if !analysis_eligible(video.len() as u64) {
            return Err(MixcutError::analysis(format!(
                "payload exceeds the {ANALYSIS_UPLOAD_LIMIT_MB} MB analysis limit"
            )));
        }

        let fingerprint = Self::fingerprint(video);
        let mood = Mood::ALL[(fingerprint % Mood::ALL.len() as u64) as usize];
        let subtype = mime_type.rsplit('/').next().unwrap_or("video");

        info!(
            backend = self.name(),
            bytes = video.len(),
            mood = mood.as_str(),
            credential_source = ?self.config.source(),
            "local analysis complete"
        );

        Ok(VideoMetadata {
            title: format!("Untitled {subtype} edit"),
            description: "Locally analyzed clip. Connect a remote analysis backend \
                          for generated copy."
                .to_string(),
            hashtags: vec!["#mixcut".to_string(), format!("#{}", mood.as_str().to_lowercase())],
            thumbnail_prompt: "hero object of the opening frame, high contrast".to_string(),
            copyright_risk: CopyrightRisk::Low,
            copyright_notes: "Local heuristics cannot inspect content; no claims detected."
                .to_string(),
            category: "General".to_string(),
            virality_score: (35 + fingerprint % 56) as u8,
            engaging_keywords: Vec::new(),
            recommended_audio_mood: mood.as_str().to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic-local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> HeuristicAnalyzer {
        HeuristicAnalyzer::new(AnalysisConfig::resolve_from(Some("test-key"), None))
    }

    #[test]
    fn test_same_bytes_same_metadata() {
        let payload = vec![7u8; 4096];
        let first = analyzer().analyze(&payload, "video/mp4").unwrap();
        let second = analyzer().analyze(&payload, "video/mp4").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mood_stays_inside_the_vocabulary() {
        for seed in 0u8..32 {
            let payload: Vec<u8> = (0..512).map(|i| (i as u8).wrapping_mul(seed)).collect();
            let metadata = analyzer().analyze(&payload, "video/webm").unwrap();
            assert!(
                metadata.recommended_mood().is_some(),
                "mood {:?} not in vocabulary",
                metadata.recommended_audio_mood
            );
            assert!(metadata.virality_score <= 100);
        }
    }

    #[test]
    fn test_different_payloads_can_disagree_on_mood() {
        let moods: std::collections::HashSet<String> = (0u8..16)
            .map(|seed| {
                let payload = vec![seed; 1024];
                analyzer()
                    .analyze(&payload, "video/mp4")
                    .unwrap()
                    .recommended_audio_mood
            })
            .collect();
        assert!(moods.len() > 1, "fingerprint collapsed to one mood");
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(analyzer().analyze(&[], "video/mp4").is_err());
    }

    #[test]
    fn test_upload_limit_gate() {
        assert!(analysis_eligible(500 * 1024 * 1024));
        assert!(!analysis_eligible(500 * 1024 * 1024 + 1));
    }
}
