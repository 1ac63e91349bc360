//! Audio enhancement chain planning.
//!
//! A plan is a typed description of the node chain to build between a
//! source and its gain stage. The connector that materializes plans
//! against a live audio graph lives with the render engine; keeping the
//! planning side pure lets chain shape be tested without any audio
//! context.

use mixcut_media_model::PlaybackSettings;
use serde::{Deserialize, Serialize};

/// Voice clarity chain parameters. The stage order is load-bearing:
/// rumble removal must precede the presence boost, and both must precede
/// compression.
pub const VOICE_HIGHPASS_CUTOFF_HZ: f64 = 100.0;
pub const VOICE_PRESENCE_FREQ_HZ: f64 = 3000.0;
pub const VOICE_PRESENCE_Q: f64 = 1.0;
pub const VOICE_PRESENCE_GAIN_DB: f64 = 4.0;
pub const VOICE_COMP_THRESHOLD_DB: f64 = -24.0;
pub const VOICE_COMP_KNEE_DB: f64 = 30.0;
pub const VOICE_COMP_RATIO: f64 = 12.0;
pub const VOICE_COMP_ATTACK_SECS: f64 = 0.003;
pub const VOICE_COMP_RELEASE_SECS: f64 = 0.25;

/// One processing stage in an enhancement chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioStage {
    /// High-pass filter attenuating content below `cutoff_hz`.
    Highpass { cutoff_hz: f64 },

    /// Peaking band filter.
    Peaking { freq_hz: f64, q: f64, gain_db: f64 },

    /// Dynamics compressor.
    Compressor {
        threshold_db: f64,
        knee_db: f64,
        ratio: f64,
        attack_secs: f64,
        release_secs: f64,
    },
}

impl AudioStage {
    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            AudioStage::Highpass { cutoff_hz } => {
                if *cutoff_hz <= 0.0 {
                    return Err(format!("highpass cutoff must be positive, got {cutoff_hz}"));
                }
            }
            AudioStage::Peaking { freq_hz, q, .. } => {
                if *freq_hz <= 0.0 {
                    return Err(format!("peaking frequency must be positive, got {freq_hz}"));
                }
                if *q <= 0.0 {
                    return Err(format!("peaking Q must be positive, got {q}"));
                }
            }
            AudioStage::Compressor {
                ratio,
                attack_secs,
                release_secs,
                ..
            } => {
                if *ratio < 1.0 {
                    return Err(format!("compressor ratio must be >= 1, got {ratio}"));
                }
                if *attack_secs < 0.0 || *release_secs < 0.0 {
                    return Err("compressor attack/release must be non-negative".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Ordered chain of stages between a source and its gain stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioChainPlan {
    pub stages: Vec<AudioStage>,
}

impl AudioChainPlan {
    /// An empty chain: source connects directly to the gain stage.
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn is_passthrough(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Validate every stage.
    pub fn validate(&self) -> Result<(), String> {
        for stage in &self.stages {
            stage.validate()?;
        }
        Ok(())
    }
}

/// Plan the voice clarity chain. Disabled means structurally absent:
/// zero stages, not a bypassed chain.
pub fn plan_voice_chain(voice_clarity: bool) -> AudioChainPlan {
    if !voice_clarity {
        return AudioChainPlan::passthrough();
    }
    AudioChainPlan {
        stages: vec![
            AudioStage::Highpass {
                cutoff_hz: VOICE_HIGHPASS_CUTOFF_HZ,
            },
            AudioStage::Peaking {
                freq_hz: VOICE_PRESENCE_FREQ_HZ,
                q: VOICE_PRESENCE_Q,
                gain_db: VOICE_PRESENCE_GAIN_DB,
            },
            AudioStage::Compressor {
                threshold_db: VOICE_COMP_THRESHOLD_DB,
                knee_db: VOICE_COMP_KNEE_DB,
                ratio: VOICE_COMP_RATIO,
                attack_secs: VOICE_COMP_ATTACK_SECS,
                release_secs: VOICE_COMP_RELEASE_SECS,
            },
        ],
    }
}

/// One source branch of the mix: enhancement chain, then a gain stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchPlan {
    pub chain: AudioChainPlan,
    pub gain: f64,
}

/// Complete mix description for one render: the video-audio branch plus
/// an optional music branch, both feeding the shared mixing destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixPlan {
    pub video: BranchPlan,
    pub music: Option<BranchPlan>,
}

impl MixPlan {
    /// Derive the mix for the current settings. Music branches carry no
    /// enhancement chain, only their gain stage.
    pub fn from_settings(settings: &PlaybackSettings, with_music: bool) -> Self {
        Self {
            video: BranchPlan {
                chain: plan_voice_chain(settings.voice_clarity),
                gain: settings.video_volume,
            },
            music: with_music.then(|| BranchPlan {
                chain: AudioChainPlan::passthrough(),
                gain: settings.music_volume,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_chain_has_three_stages_in_order() {
        let plan = plan_voice_chain(true);
        assert_eq!(plan.len(), 3);
        assert!(matches!(
            plan.stages[0],
            AudioStage::Highpass { cutoff_hz } if cutoff_hz == 100.0
        ));
        assert!(matches!(
            plan.stages[1],
            AudioStage::Peaking { freq_hz, q, gain_db }
                if freq_hz == 3000.0 && q == 1.0 && gain_db == 4.0
        ));
        assert!(matches!(
            plan.stages[2],
            AudioStage::Compressor { threshold_db, knee_db, ratio, attack_secs, release_secs }
                if threshold_db == -24.0
                    && knee_db == 30.0
                    && ratio == 12.0
                    && attack_secs == 0.003
                    && release_secs == 0.25
        ));
    }

    #[test]
    fn test_disabled_chain_is_structurally_absent() {
        let plan = plan_voice_chain(false);
        assert!(plan.is_passthrough());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn test_voice_chain_validates() {
        assert!(plan_voice_chain(true).validate().is_ok());
    }

    #[test]
    fn test_stage_validation_catches_bad_params() {
        assert!(AudioStage::Highpass { cutoff_hz: 0.0 }.validate().is_err());
        assert!(AudioStage::Peaking {
            freq_hz: 3000.0,
            q: -1.0,
            gain_db: 4.0
        }
        .validate()
        .is_err());
        assert!(AudioStage::Compressor {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 0.5,
            attack_secs: 0.003,
            release_secs: 0.25
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_mix_plan_carries_volumes() {
        let mut settings = PlaybackSettings::default();
        settings.voice_clarity = true;

        let plan = MixPlan::from_settings(&settings, true);
        assert_eq!(plan.video.chain.len(), 3);
        assert!((plan.video.gain - 1.0).abs() < 1e-9);

        let music = plan.music.unwrap();
        assert!(music.chain.is_passthrough());
        assert!((music.gain - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_mix_plan_without_music() {
        let plan = MixPlan::from_settings(&PlaybackSettings::default(), false);
        assert!(plan.music.is_none());
        assert!(plan.video.chain.is_passthrough());
    }

    #[test]
    fn test_stage_serialization_is_tagged() {
        let stage = AudioStage::Highpass { cutoff_hz: 100.0 };
        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("\"type\":\"highpass\""));
    }
}
