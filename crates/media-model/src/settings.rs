//! Playback settings owned by the editing session.

use serde::{Deserialize, Serialize};

/// Playback rate, restricted to the rates the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackRate {
    Half,
    #[default]
    Normal,
    OnePointFive,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OnePointFive,
        PlaybackRate::Double,
    ];

    /// Numeric rate applied to media elements.
    pub fn as_f64(&self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OnePointFive => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Display label (e.g. "1.5x").
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackRate::Half => "0.5x",
            PlaybackRate::Normal => "1x",
            PlaybackRate::OnePointFive => "1.5x",
            PlaybackRate::Double => "2x",
        }
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| (r.as_f64() - value).abs() < 1e-9)
            .ok_or_else(|| format!("unsupported playback rate: {value}"))
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> f64 {
        rate.as_f64()
    }
}

/// Named visual filter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualFilter {
    /// Identity preset, contributes nothing to the composed expression.
    #[default]
    Original,
    Grayscale,
    Sepia,
    HighContrast,
    Brighten,
    Vintage,
    Cyberpunk,
}

impl VisualFilter {
    pub const ALL: [VisualFilter; 7] = [
        VisualFilter::Original,
        VisualFilter::Grayscale,
        VisualFilter::Sepia,
        VisualFilter::HighContrast,
        VisualFilter::Brighten,
        VisualFilter::Vintage,
        VisualFilter::Cyberpunk,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            VisualFilter::Original => "Original",
            VisualFilter::Grayscale => "Grayscale",
            VisualFilter::Sepia => "Sepia",
            VisualFilter::HighContrast => "High Contrast",
            VisualFilter::Brighten => "Brighten",
            VisualFilter::Vintage => "Vintage",
            VisualFilter::Cyberpunk => "Cyberpunk",
        }
    }
}

/// Per-session playback and enhancement settings.
///
/// Reset to defaults whenever a new media source is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Shared playback rate for video, its audio, and music.
    pub rate: PlaybackRate,

    /// Selected visual filter preset.
    pub visual_filter: VisualFilter,

    /// Background music gain `[0, 1]`.
    pub music_volume: f64,

    /// Source audio gain `[0, 1]`.
    pub video_volume: f64,

    /// Whether the voice clarity chain is inserted.
    pub voice_clarity: bool,

    /// Whether the simulated HD upscale boost is applied.
    pub hd_upscale: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            rate: PlaybackRate::Normal,
            visual_filter: VisualFilter::Original,
            music_volume: 0.4,
            video_volume: 1.0,
            voice_clarity: false,
            hd_upscale: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fresh_session() {
        let settings = PlaybackSettings::default();
        assert_eq!(settings.rate, PlaybackRate::Normal);
        assert_eq!(settings.visual_filter, VisualFilter::Original);
        assert!((settings.music_volume - 0.4).abs() < 1e-9);
        assert!((settings.video_volume - 1.0).abs() < 1e-9);
        assert!(!settings.voice_clarity);
        assert!(!settings.hd_upscale);
    }

    #[test]
    fn test_rate_roundtrips_through_f64() {
        for rate in PlaybackRate::ALL {
            assert_eq!(PlaybackRate::try_from(rate.as_f64()).unwrap(), rate);
        }
        assert!(PlaybackRate::try_from(3.0).is_err());
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let mut settings = PlaybackSettings::default();
        settings.rate = PlaybackRate::Double;
        settings.visual_filter = VisualFilter::Vintage;
        settings.voice_clarity = true;

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("2.0"));
        let parsed: PlaybackSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let parsed: PlaybackSettings = serde_json::from_str(r#"{"rate": 1.5}"#).unwrap();
        assert_eq!(parsed.rate, PlaybackRate::OnePointFive);
        assert_eq!(parsed.visual_filter, VisualFilter::Original);
    }
}
