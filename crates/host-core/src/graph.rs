//! Audio graph contract.
//!
//! A graph session owns every node created through it. Nodes are built and
//! wired while elements are paused; playback starts only after the full
//! topology is connected. `close` releases the device and invalidates all
//! node ids, and must be called exactly once per session.

use mixcut_common::MixcutResult;

use crate::capture::StreamHandle;
use crate::element::MediaElement;

/// Opaque id of a node inside one graph session.
///
/// Ids are meaningless across sessions; a closed session invalidates all of
/// its ids at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// One audio mixing session.
///
/// The constructors mirror the processing stages a mix plan is made of.
/// Creating a source node captures the element's audio into the graph; the
/// element's direct output should be muted by the caller so the graph is the
/// only audible path.
pub trait AudioGraph: Send {
    /// Capture an element's audio into the graph.
    ///
    /// Fails when the host cannot tap the element (cross-origin media is the
    /// common case). The element itself keeps playing; only its audio is
    /// unreachable.
    fn create_source(&mut self, element: &dyn MediaElement) -> MixcutResult<NodeId>;

    /// High-pass filter node.
    fn create_highpass(&mut self, cutoff_hz: f64) -> MixcutResult<NodeId>;

    /// Peaking EQ node.
    fn create_peaking(&mut self, freq_hz: f64, q: f64, gain_db: f64) -> MixcutResult<NodeId>;

    /// Dynamics compressor node.
    fn create_compressor(
        &mut self,
        threshold_db: f64,
        knee_db: f64,
        ratio: f64,
        attack_secs: f64,
        release_secs: f64,
    ) -> MixcutResult<NodeId>;

    /// Gain node.
    fn create_gain(&mut self, gain: f64) -> MixcutResult<NodeId>;

    /// Connect one node's output to another's input.
    fn connect(&mut self, from: NodeId, to: NodeId) -> MixcutResult<()>;

    /// Connect a node to the session's mixed output.
    fn connect_to_destination(&mut self, from: NodeId) -> MixcutResult<()>;

    /// The mixed output as a capturable stream.
    fn destination_stream(&self) -> MixcutResult<StreamHandle>;

    /// Number of live nodes in the session.
    fn node_count(&self) -> usize;

    /// Release the session and every node in it.
    ///
    /// Closing twice is an error; the owner tears down exactly once.
    fn close(&mut self) -> MixcutResult<()>;
}
