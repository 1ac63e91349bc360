//! Deterministic in-memory media host.
//!
//! Every contract in `mixcut-host-core` is implemented over a synthetic
//! clock: elements advance only when the clock is stepped, the frame sink
//! records draws instead of rasterizing, and the recorder counts frames
//! instead of encoding. A shared ledger keeps the state of every resource a
//! host handed out, so tests can assert on teardown order, node topology,
//! and draw history after a run finishes.
//!
//! Fault injection is part of the host configuration: a music element that
//! never becomes ready, a graph that refuses to tap a source, a recorder
//! that fails on stop. The render pipeline under test cannot tell this host
//! from a real one.

pub mod clock;
pub mod element;
pub mod graph;
pub mod host;
pub mod ledger;
pub mod scheduler;
pub mod sink;

pub use clock::SimClock;
pub use element::{ElementKind, SimMediaElement};
pub use graph::{NodeKind, SimAudioGraph};
pub use host::{SimFaults, SimHost, SimHostConfig};
pub use ledger::{
    ElementSnapshot, GraphSnapshot, RecorderSnapshot, SimLedger, SinkSnapshot,
};
pub use scheduler::SimScheduler;
pub use sink::{SimFrameSink, SimRecorder};
