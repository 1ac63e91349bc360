//! Mixcut Processing Core
//!
//! Pure render computation shared by preview and export:
//! - **Filter composition:** Map preset + upscale flag to one filter expression
//! - **Audio chain planning:** Typed descriptions of the enhancement graph
//! - **Progress accounting:** Clamped, monotonic percentage over a trim window
//!
//! This crate is pure computation: no I/O, no host dependencies.
//! All inputs are data; all outputs are data.

pub mod audio_chain;
pub mod filter;
pub mod progress;

pub use audio_chain::{plan_voice_chain, AudioChainPlan, AudioStage, BranchPlan, MixPlan};
pub use filter::{compose, preset_expression, IDENTITY_EXPRESSION, UPSCALE_BOOST};
pub use progress::ProgressGauge;
