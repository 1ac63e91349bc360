//! Ledger of every resource a sim host handed out.
//!
//! State stays observable after ownership moves into a pipeline: resources
//! share their state with the ledger, and tests take snapshots once a run
//! finishes. This is how teardown is verified from the outside.

use std::collections::HashMap;
use std::sync::Arc;

use mixcut_host_core::StreamHandle;
use parking_lot::Mutex;

use crate::clock::SimClock;
use crate::element::{ElementKind, ElementState};
use crate::graph::{GraphState, NodeKind};
use crate::sink::{RecorderState, SinkState};

/// What a registered stream handle points at.
pub(crate) enum StreamRecord {
    /// A frame sink's captured video track.
    SinkVideo {
        sink: Arc<Mutex<SinkState>>,
        fps: u32,
    },
    /// An audio graph's mixed destination.
    GraphAudio,
}

/// Allocates stream handles and resolves them back to their producers.
#[derive(Default)]
pub(crate) struct StreamRegistry {
    next_id: u64,
    streams: HashMap<u64, StreamRecord>,
}

impl StreamRegistry {
    pub(crate) fn register(&mut self, record: StreamRecord) -> StreamHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.streams.insert(id, record);
        StreamHandle(id)
    }

    pub(crate) fn get(&self, handle: StreamHandle) -> Option<&StreamRecord> {
        self.streams.get(&handle.0)
    }
}

#[derive(Default)]
pub(crate) struct LedgerInner {
    pub elements: Vec<Arc<Mutex<ElementState>>>,
    pub graphs: Vec<Arc<Mutex<GraphState>>>,
    pub sinks: Vec<Arc<Mutex<SinkState>>>,
    pub recorders: Vec<Arc<Mutex<RecorderState>>>,
}

/// Point-in-time view of one element.
#[derive(Debug, Clone)]
pub struct ElementSnapshot {
    pub kind: ElementKind,
    pub label: String,
    pub playing: bool,
    pub position_secs: f64,
    pub muted: bool,
    pub volume: f64,
    pub rate: f64,
    pub looping: bool,
    pub ended: bool,
    pub play_count: u32,
    pub pause_count: u32,
}

/// Point-in-time view of one graph session.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub closed: bool,
    pub close_count: u32,
    /// Empty after close; node kinds in creation order before.
    pub node_kinds: Vec<NodeKind>,
    pub connection_count: usize,
    pub to_destination_count: usize,
    pub sources_created: usize,
}

/// Point-in-time view of one frame sink.
#[derive(Debug, Clone)]
pub struct SinkSnapshot {
    pub width: u32,
    pub height: u32,
    pub filter: String,
    pub frames_drawn: u64,
    /// Element position at each draw, in draw order.
    pub draw_positions: Vec<f64>,
}

/// Point-in-time view of one recorder.
#[derive(Debug, Clone)]
pub struct RecorderSnapshot {
    pub started: bool,
    pub stopped: bool,
    pub discarded: bool,
    pub mime: String,
}

/// Cloneable inspection handle over a sim host's resources.
#[derive(Clone)]
pub struct SimLedger {
    pub(crate) inner: Arc<Mutex<LedgerInner>>,
    pub(crate) clock: SimClock,
}

impl SimLedger {
    pub fn elements(&self) -> Vec<ElementSnapshot> {
        let now = self.clock.now_ns();
        let inner = self.inner.lock();
        inner
            .elements
            .iter()
            .map(|state| {
                let s = state.lock();
                ElementSnapshot {
                    kind: s.kind,
                    label: s.label.clone(),
                    playing: s.playing,
                    position_secs: s.position(now),
                    muted: s.muted,
                    volume: s.volume,
                    rate: s.rate,
                    looping: s.looping,
                    ended: s.at_end(now),
                    play_count: s.play_count,
                    pause_count: s.pause_count,
                }
            })
            .collect()
    }

    /// Elements of one kind, in creation order.
    pub fn elements_of(&self, kind: ElementKind) -> Vec<ElementSnapshot> {
        self.elements()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn graphs(&self) -> Vec<GraphSnapshot> {
        let inner = self.inner.lock();
        inner
            .graphs
            .iter()
            .map(|state| {
                let s = state.lock();
                GraphSnapshot {
                    closed: s.closed,
                    close_count: s.close_count,
                    node_kinds: s.nodes.iter().map(|n| n.kind.clone()).collect(),
                    connection_count: s.connections.len(),
                    to_destination_count: s.to_destination.len(),
                    sources_created: s.sources_created,
                }
            })
            .collect()
    }

    pub fn sinks(&self) -> Vec<SinkSnapshot> {
        let inner = self.inner.lock();
        inner
            .sinks
            .iter()
            .map(|state| {
                let s = state.lock();
                SinkSnapshot {
                    width: s.width,
                    height: s.height,
                    filter: s.filter.clone(),
                    frames_drawn: s.draws.len() as u64,
                    draw_positions: s.draws.iter().map(|d| d.position_secs).collect(),
                }
            })
            .collect()
    }

    pub fn recorders(&self) -> Vec<RecorderSnapshot> {
        let inner = self.inner.lock();
        inner
            .recorders
            .iter()
            .map(|state| {
                let s = state.lock();
                RecorderSnapshot {
                    started: s.started,
                    stopped: s.stopped,
                    discarded: s.discarded,
                    mime: s.mime.clone(),
                }
            })
            .collect()
    }
}
