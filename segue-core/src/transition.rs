//! Transition vocabulary mapping
//!
//! Theme definitions carry transition metadata in the vocabulary of the
//! source data format; the segment sequencer speaks its own. The mapping is
//! total: every input value, including `Unknown`, maps to a defined output,
//! so a theme with garbage metadata still transitions (plainly, on a
//! measure boundary).

use crate::theme::{TransitionEffect, TransitionTiming};

/// A short musical variation layered atop a segment during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embellishment {
    None,
    Groove,
    Fill,
    Break,
    Intro,
    End,
    EndAndIntro,
}

/// The boundary at which the sequencer lets a transition take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    Instant,
    Beat,
    Measure,
}

/// Map a theme's transition style onto the sequencer's embellishment kinds.
pub fn embellishment_for(effect: TransitionEffect) -> Embellishment {
    match effect {
        TransitionEffect::Unknown | TransitionEffect::None => Embellishment::None,
        TransitionEffect::Groove => Embellishment::Groove,
        TransitionEffect::Fill => Embellishment::Fill,
        TransitionEffect::Break => Embellishment::Break,
        TransitionEffect::Intro => Embellishment::Intro,
        TransitionEffect::End => Embellishment::End,
        TransitionEffect::EndAndIntro => Embellishment::EndAndIntro,
    }
}

/// Map a theme's transition timing onto the sequencer's boundary kinds.
pub fn timing_for(timing: TransitionTiming) -> Timing {
    match timing {
        TransitionTiming::Unknown | TransitionTiming::Measure => Timing::Measure,
        TransitionTiming::Immediate => Timing::Instant,
        TransitionTiming::Beat => Timing::Beat,
    }
}
