//! Mixcut host contracts.
//!
//! This crate defines the seams between the render/playback logic and the
//! host that actually decodes, mixes, draws, and encodes media. The render
//! pipeline is written entirely against these traits, so a deterministic
//! in-memory host can drive it in tests while a real host drives it in
//! production.

pub mod capture;
pub mod element;
pub mod graph;
pub mod host;
pub mod scheduler;

pub use capture::*;
pub use element::*;
pub use graph::*;
pub use host::*;
pub use scheduler::*;
