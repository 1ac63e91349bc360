//! The structured result of a video analysis.
//!
//! Field names follow the wire contract of the analysis backend
//! (camelCase JSON), so a remote response deserializes directly.

use mixcut_media_model::Mood;
use serde::{Deserialize, Serialize};

/// Estimated risk of copyright claims against the analyzed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CopyrightRisk {
    Low,
    Medium,
    High,
}

/// Everything the analysis collaborator knows about a video.
///
/// The render core consumes only `recommended_audio_mood`; the rest flows
/// through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Suggested publish title.
    pub title: String,
    /// Suggested long-form description.
    pub description: String,
    /// Suggested tags, most relevant first.
    pub hashtags: Vec<String>,
    /// Prompt for a thumbnail generator describing the hero frame.
    pub thumbnail_prompt: String,
    pub copyright_risk: CopyrightRisk,
    /// Explanation behind the risk estimate.
    pub copyright_notes: String,
    /// Best-fitting publish category.
    pub category: String,
    /// Predicted audience appeal, 0 to 100.
    pub virality_score: u8,
    /// High-impact keywords detected in the content.
    pub engaging_keywords: Vec<String>,
    /// Mood hint for background music selection, drawn from the shared
    /// mood vocabulary. Kept as the raw string the backend sent.
    pub recommended_audio_mood: String,
}

impl VideoMetadata {
    /// The mood hint parsed against the shared vocabulary. `None` when
    /// the backend sent something outside it.
    pub fn recommended_mood(&self) -> Option<Mood> {
        Mood::parse(&self.recommended_audio_mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VideoMetadata {
        VideoMetadata {
            title: "Desk Tour 2026".into(),
            description: "A walkthrough of the setup.".into(),
            hashtags: vec!["#desksetup".into(), "#productivity".into()],
            thumbnail_prompt: "glowing mechanical keyboard, high contrast".into(),
            copyright_risk: CopyrightRisk::Low,
            copyright_notes: "No third-party audio detected.".into(),
            category: "Tech".into(),
            virality_score: 62,
            engaging_keywords: vec!["keyboard".into()],
            recommended_audio_mood: "Chill".into(),
        }
    }

    #[test]
    fn test_wire_format_is_camel_case_with_uppercase_risk() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["copyrightRisk"], "LOW");
        assert_eq!(json["viralityScore"], 62);
        assert_eq!(json["recommendedAudioMood"], "Chill");
        assert!(json.get("virality_score").is_none());
    }

    #[test]
    fn test_mood_hint_parses_against_shared_vocabulary() {
        let mut metadata = sample();
        assert_eq!(metadata.recommended_mood(), Some(Mood::Chill));
        metadata.recommended_audio_mood = "Melancholic".into();
        assert_eq!(metadata.recommended_mood(), None);
    }
}
