//! Mixcut Media Model
//!
//! Defines the core data contracts for Mixcut editing sessions:
//! - **Sources:** Registered handles to user-selected media files
//! - **Trim:** The selected sub-range of the source used for preview and export
//! - **Settings:** Playback rate, visual filter, volumes, enhancement flags
//! - **Music:** The builtin background-music catalog and mood selection
//! - **Session:** JSON persistence for a complete edit description
//!
//! All time values are media time in seconds, as reported by the decoding
//! element, so they survive rate changes and host clock differences.

pub mod music;
pub mod session;
pub mod settings;
pub mod source;
pub mod trim;

pub use music::*;
pub use session::*;
pub use settings::*;
pub use source::*;
pub use trim::*;
