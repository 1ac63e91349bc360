//! Mixcut Video Intelligence
//!
//! Collaborator contracts around the render core:
//! - **Metadata analysis:** video bytes in, structured [`VideoMetadata`]
//!   out; the core consumes only the recommended audio mood
//! - **Thumbnail generation:** prompt + aspect ratio in, image bytes out
//! - **Analysis persistence:** fire-and-forget records of past analyses
//!
//! No transport lives here. A deterministic local analyzer stands in when
//! no remote backend is wired, so mood-driven track selection works
//! offline.

pub mod analyzer;
pub mod config;
pub mod metadata;
pub mod persistence;
pub mod thumbnail;

pub use analyzer::{
    analysis_eligible, HeuristicAnalyzer, MetadataAnalyzer, ANALYSIS_UPLOAD_LIMIT_MB,
};
pub use config::{AnalysisConfig, CredentialSource, CREDENTIAL_ENV_VAR};
pub use metadata::{CopyrightRisk, VideoMetadata};
pub use persistence::{record_analysis, AnalysisRecord, AnalysisStore};
pub use thumbnail::{
    ThumbnailAspect, ThumbnailClient, ThumbnailGenerator, ThumbnailImage, ThumbnailRequest,
};
