//! Collaborator traits: segment sequencer and segment store
//!
//! The playback system does not synthesize audio or decode composition
//! files itself. The embedder supplies a [`Sequencer`] (created at the
//! output sample rate) and a [`SegmentStore`]; both are owned by the render
//! callback once playback starts, so all their mutation happens on the
//! render thread.

use segue_core::{Embellishment, Timing};

use crate::error::SegmentError;

/// The segment-mixing engine that synthesizes PCM.
///
/// Implementations must keep [`Sequencer::render`] fit for a real-time
/// callback: no blocking, no unbounded work.
pub trait Sequencer: Send + 'static {
    /// Loaded, sequencer-native representation of a composition.
    type Segment: Send;

    /// Fill `out` with interleaved stereo samples.
    ///
    /// Never fails; a sequencer with nothing scheduled produces silence.
    fn render(&mut self, out: &mut [f32]);

    /// Schedule a transition into `segment`, decorated with `embellishment`
    /// and quantized to `timing`. The sequencer takes its own reference to
    /// the segment; the caller's handle may be dropped afterwards.
    fn play_transition(
        &mut self,
        segment: &Self::Segment,
        embellishment: Embellishment,
        timing: Timing,
    );

    /// Schedule `segment` without embellishment; `None` transitions to
    /// silence.
    fn play_segment(&mut self, segment: Option<&Self::Segment>, timing: Timing);

    /// Set the gain applied to rendered samples.
    fn set_volume(&mut self, volume: f32);
}

/// Loads sequencer-native segments by composition file id.
pub trait SegmentStore<S>: Send + 'static {
    /// Load the segment for `file`.
    ///
    /// Runs synchronously on the render thread's critical path; callers
    /// should pre-warm expected themes where feasible. Hiding that cost is
    /// out of scope here.
    fn load(&mut self, file: &str) -> Result<S, SegmentError>;
}
