//! Mixcut Render Engine
//!
//! The export core: a tick-driven state machine that runs offscreen
//! playback, audio mixing, frame compositing, and stream capture against a
//! media host, plus an offline gstreamer backend that renders an edit
//! straight from a file on disk.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source file ──┬─ offscreen video ─► frame sink (grade + draw) ──┐
//!               │                                                 ├─► recorder ─► artifact
//!               └─ offscreen audio ─► voice chain ─► gain ─┐      │
//! music track ──── music element ──────────────────► gain ─┴─ mix ┘
//! ```
//!
//! One render run owns everything it creates; teardown runs exactly once on
//! the success, cancel, and failure paths alike.

pub mod artifact;
pub mod export;
pub mod graph;
pub mod pipeline;

pub use artifact::{export_file_name, RenderedExport, EXPORT_EXTENSION};
pub use export::{export_offline, ExportBackend, GstExportBackend, OfflineExportJob};
pub use graph::wire_mix_plan;
pub use pipeline::{
    CancelHandle, ProgressCallback, RenderOutcome, RenderPipeline, RenderProgress, RenderRequest,
    RenderStatus, TickOutcome, DEFAULT_CAPTURE_FPS,
};
