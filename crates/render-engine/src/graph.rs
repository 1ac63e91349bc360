//! Materializes a mix plan into a live audio graph.
//!
//! The planner (`mixcut-processing-core`) decides what stages exist; this
//! module only turns stage descriptions into nodes and wires them. Keeping
//! the two apart means the chain's order and parameters are unit-testable
//! without any graph at all.

use mixcut_common::MixcutResult;
use mixcut_host_core::{AudioGraph, MediaElement, NodeId};
use mixcut_processing_core::{AudioStage, BranchPlan, MixPlan};
use tracing::warn;

/// Wire the full mix into `graph`: the video-audio branch, then the music
/// branch when both a plan and an element for it exist.
///
/// The video branch is load-bearing; any failure there is the render's
/// failure. The music branch degrades: a source that cannot be tapped is
/// logged and skipped, and the mix proceeds without it. Returns whether
/// music ended up connected.
pub fn wire_mix_plan(
    graph: &mut dyn AudioGraph,
    plan: &MixPlan,
    video_audio: &dyn MediaElement,
    music: Option<&dyn MediaElement>,
) -> MixcutResult<bool> {
    wire_branch(graph, &plan.video, video_audio)?;

    let mut music_connected = false;
    if let (Some(branch), Some(element)) = (plan.music.as_ref(), music) {
        match wire_branch(graph, branch, element) {
            Ok(_) => music_connected = true,
            Err(error) => {
                warn!(%error, "background music left out of the mix");
            }
        }
    }
    Ok(music_connected)
}

/// Wire one branch: source, the planned stages in order, then the gain
/// stage into the shared destination. Returns the gain node.
fn wire_branch(
    graph: &mut dyn AudioGraph,
    branch: &BranchPlan,
    element: &dyn MediaElement,
) -> MixcutResult<NodeId> {
    let source = graph.create_source(element)?;
    let mut terminal = source;
    for stage in &branch.chain.stages {
        let node = match *stage {
            AudioStage::Highpass { cutoff_hz } => graph.create_highpass(cutoff_hz)?,
            AudioStage::Peaking {
                freq_hz,
                q,
                gain_db,
            } => graph.create_peaking(freq_hz, q, gain_db)?,
            AudioStage::Compressor {
                threshold_db,
                knee_db,
                ratio,
                attack_secs,
                release_secs,
            } => graph.create_compressor(threshold_db, knee_db, ratio, attack_secs, release_secs)?,
        };
        graph.connect(terminal, node)?;
        terminal = node;
    }
    let gain = graph.create_gain(branch.gain)?;
    graph.connect(terminal, gain)?;
    graph.connect_to_destination(gain)?;
    Ok(gain)
}
