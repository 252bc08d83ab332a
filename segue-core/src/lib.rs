//! Segue core - shared music vocabulary
//!
//! This crate holds the types passed between game logic (the control side)
//! and the playback system (the render side): theme descriptors, playback
//! context tags, the transition vocabulary used by the segment sequencer,
//! and the theme-definition table that resolves logical music ids.
//!
//! Nothing in here touches an audio device or a thread; everything is plain
//! data plus a handful of pure mapping functions.

pub mod tags;
pub mod theme;
pub mod transition;

pub use tags::Tags;
pub use theme::{Theme, ThemeTable, TransitionEffect, TransitionTiming};
pub use transition::{Embellishment, Timing, embellishment_for, timing_for};
