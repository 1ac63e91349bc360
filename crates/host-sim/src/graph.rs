//! Simulated audio graph.
//!
//! Nodes are records, not DSP: each constructor appends a `NodeRecord` with
//! the exact parameters it was given, and `connect` appends edges. Tests
//! read the records back through the ledger to assert on chain topology and
//! stage parameters. `close` clears the node table and counts every attempt,
//! which is how teardown-exactly-once violations surface.

use std::sync::Arc;

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_host_core::{AudioGraph, MediaElement, NodeId, StreamHandle};
use parking_lot::Mutex;

use crate::ledger::{StreamRecord, StreamRegistry};

/// Parameters a node was created with.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Tap over an element's audio. Duration identifies the element.
    Source { media_duration_secs: f64 },
    Highpass {
        cutoff_hz: f64,
    },
    Peaking {
        freq_hz: f64,
        q: f64,
        gain_db: f64,
    },
    Compressor {
        threshold_db: f64,
        knee_db: f64,
        ratio: f64,
        attack_secs: f64,
        release_secs: f64,
    },
    Gain {
        gain: f64,
    },
}

/// One created node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: u64,
    pub kind: NodeKind,
}

/// Mutable state of one graph session, shared with the host ledger.
#[derive(Debug, Default)]
pub struct GraphState {
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<(u64, u64)>,
    pub to_destination: Vec<u64>,
    pub closed: bool,
    /// Close attempts, successful or not.
    pub close_count: u32,
    pub sources_created: usize,
    /// Fail `create_source` once this many sources exist.
    pub fail_source_after: Option<usize>,
    pub(crate) next_node_id: u64,
}

/// Simulated mixing session.
pub struct SimAudioGraph {
    state: Arc<Mutex<GraphState>>,
    streams: Arc<Mutex<StreamRegistry>>,
}

impl SimAudioGraph {
    pub(crate) fn new(
        state: Arc<Mutex<GraphState>>,
        streams: Arc<Mutex<StreamRegistry>>,
    ) -> Self {
        Self { state, streams }
    }

    fn add_node(&mut self, kind: NodeKind) -> MixcutResult<NodeId> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(MixcutError::audio_graph("graph is closed"));
        }
        let id = state.next_node_id;
        state.next_node_id += 1;
        state.nodes.push(NodeRecord { id, kind });
        Ok(NodeId(id))
    }

    fn ensure_node(state: &GraphState, id: NodeId) -> MixcutResult<()> {
        if state.nodes.iter().any(|n| n.id == id.0) {
            Ok(())
        } else {
            Err(MixcutError::audio_graph(format!(
                "unknown node id {}",
                id.0
            )))
        }
    }
}

impl AudioGraph for SimAudioGraph {
    fn create_source(&mut self, element: &dyn MediaElement) -> MixcutResult<NodeId> {
        let metadata = element
            .metadata()
            .map_err(|e| MixcutError::audio_graph(format!("cannot tap element audio: {e}")))?;
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(MixcutError::audio_graph("graph is closed"));
            }
            if let Some(limit) = state.fail_source_after {
                if state.sources_created >= limit {
                    return Err(MixcutError::audio_graph(
                        "cannot capture tainted media source",
                    ));
                }
            }
            state.sources_created += 1;
        }
        self.add_node(NodeKind::Source {
            media_duration_secs: metadata.duration_secs,
        })
    }

    fn create_highpass(&mut self, cutoff_hz: f64) -> MixcutResult<NodeId> {
        self.add_node(NodeKind::Highpass { cutoff_hz })
    }

    fn create_peaking(&mut self, freq_hz: f64, q: f64, gain_db: f64) -> MixcutResult<NodeId> {
        self.add_node(NodeKind::Peaking { freq_hz, q, gain_db })
    }

    fn create_compressor(
        &mut self,
        threshold_db: f64,
        knee_db: f64,
        ratio: f64,
        attack_secs: f64,
        release_secs: f64,
    ) -> MixcutResult<NodeId> {
        self.add_node(NodeKind::Compressor {
            threshold_db,
            knee_db,
            ratio,
            attack_secs,
            release_secs,
        })
    }

    fn create_gain(&mut self, gain: f64) -> MixcutResult<NodeId> {
        self.add_node(NodeKind::Gain { gain })
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> MixcutResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(MixcutError::audio_graph("graph is closed"));
        }
        Self::ensure_node(&state, from)?;
        Self::ensure_node(&state, to)?;
        state.connections.push((from.0, to.0));
        Ok(())
    }

    fn connect_to_destination(&mut self, from: NodeId) -> MixcutResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(MixcutError::audio_graph("graph is closed"));
        }
        Self::ensure_node(&state, from)?;
        state.to_destination.push(from.0);
        Ok(())
    }

    fn destination_stream(&self) -> MixcutResult<StreamHandle> {
        if self.state.lock().closed {
            return Err(MixcutError::audio_graph("graph is closed"));
        }
        let handle = self.streams.lock().register(StreamRecord::GraphAudio);
        Ok(handle)
    }

    fn node_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    fn close(&mut self) -> MixcutResult<()> {
        let mut state = self.state.lock();
        state.close_count += 1;
        if state.closed {
            return Err(MixcutError::audio_graph("graph already closed"));
        }
        state.closed = true;
        state.nodes.clear();
        state.connections.clear();
        state.to_destination.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::element::{ElementKind, ElementState, SimMediaElement};

    fn test_graph() -> SimAudioGraph {
        SimAudioGraph::new(
            Arc::new(Mutex::new(GraphState::default())),
            Arc::new(Mutex::new(StreamRegistry::default())),
        )
    }

    fn ready_element(duration: f64) -> SimMediaElement {
        let state = ElementState {
            kind: ElementKind::Audio,
            label: "a.mp4".to_string(),
            duration_secs: duration,
            width: 0,
            height: 0,
            polls_until_ready: 0,
            load_fails: false,
            anchor_media_secs: 0.0,
            anchor_clock_ns: 0,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            looping: false,
            play_count: 0,
            pause_count: 0,
            seek_count: 0,
        };
        SimMediaElement::new(SimClock::new(), Arc::new(Mutex::new(state)))
    }

    #[test]
    fn test_nodes_record_parameters() {
        let mut graph = test_graph();
        let hp = graph.create_highpass(100.0).unwrap();
        let gain = graph.create_gain(0.4).unwrap();
        graph.connect(hp, gain).unwrap();
        graph.connect_to_destination(gain).unwrap();

        let state = graph.state.lock();
        assert_eq!(state.nodes.len(), 2);
        assert_eq!(state.nodes[0].kind, NodeKind::Highpass { cutoff_hz: 100.0 });
        assert_eq!(state.connections, vec![(hp.0, gain.0)]);
        assert_eq!(state.to_destination, vec![gain.0]);
    }

    #[test]
    fn test_source_requires_loaded_element() {
        let mut graph = test_graph();
        let el = ready_element(30.0);
        el.state_handle().lock().load_fails = true;
        assert!(graph.create_source(&el).is_err());
    }

    #[test]
    fn test_source_limit_fault() {
        let mut graph = test_graph();
        graph.state.lock().fail_source_after = Some(1);
        let a = ready_element(30.0);
        let b = ready_element(180.0);
        assert!(graph.create_source(&a).is_ok());
        assert!(graph.create_source(&b).is_err());
    }

    #[test]
    fn test_close_clears_nodes_and_counts_attempts() {
        let mut graph = test_graph();
        graph.create_gain(1.0).unwrap();
        assert_eq!(graph.node_count(), 1);

        graph.close().unwrap();
        assert_eq!(graph.node_count(), 0);
        assert!(graph.close().is_err());
        assert_eq!(graph.state.lock().close_count, 2);
    }

    #[test]
    fn test_operations_rejected_after_close() {
        let mut graph = test_graph();
        graph.close().unwrap();
        assert!(graph.create_gain(1.0).is_err());
        assert!(graph.destination_stream().is_err());
    }

    #[test]
    fn test_connect_unknown_node_rejected() {
        let mut graph = test_graph();
        let gain = graph.create_gain(1.0).unwrap();
        assert!(graph.connect(gain, NodeId(99)).is_err());
    }
}
