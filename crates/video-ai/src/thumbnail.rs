//! Thumbnail generation contract.
//!
//! Contract only; the image backend lives outside this crate and is
//! independent of render state.

use mixcut_common::MixcutResult;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// Output shape of the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThumbnailAspect {
    #[default]
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "1:1")]
    Square,
}

impl ThumbnailAspect {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailAspect::Wide => "16:9",
            ThumbnailAspect::Tall => "9:16",
            ThumbnailAspect::Square => "1:1",
        }
    }
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    /// Scene description, typically `VideoMetadata::thumbnail_prompt`.
    pub prompt: String,
    #[serde(default)]
    pub aspect: ThumbnailAspect,
}

/// A generated image.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// An image generation backend.
pub trait ThumbnailGenerator {
    fn generate(&self, request: &ThumbnailRequest) -> MixcutResult<ThumbnailImage>;
}

/// Handle to a not-yet-wired backend; carries the resolved credential so
/// callers can construct requests up front.
pub struct ThumbnailClient {
    config: AnalysisConfig,
}

impl ThumbnailClient {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_serializes_as_ratio_string() {
        let request = ThumbnailRequest {
            prompt: "glowing keyboard".into(),
            aspect: ThumbnailAspect::Tall,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["aspect"], "9:16");
    }

    #[test]
    fn test_aspect_defaults_to_wide() {
        let request: ThumbnailRequest =
            serde_json::from_str(r#"{"prompt":"hero shot"}"#).unwrap();
        assert_eq!(request.aspect, ThumbnailAspect::Wide);
    }
}
