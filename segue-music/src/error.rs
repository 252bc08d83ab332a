//! Error types for the playback system
//!
//! Segment failures are caught at the render-callback boundary and never
//! escape it; anything surfacing through the real-time audio path would be
//! fatal to the process, so the callback contains them and degrades
//! playback to silence instead.

use thiserror::Error;

/// Failure while loading a segment from the store.
#[derive(Debug, Clone, Error)]
pub enum SegmentError {
    /// The composition file does not exist in the store.
    #[error("segment not found: \"{0}\"")]
    NotFound(String),

    /// The composition file exists but could not be decoded.
    #[error("segment corrupt: \"{0}\": {1}")]
    Corrupt(String, String),

    /// Resource exhaustion while loading or preparing the segment.
    #[error("out of memory for segment: \"{0}\"")]
    Allocation(String),
}

/// Errors surfaced through the control-side API.
#[derive(Debug, Error)]
pub enum MusicError {
    /// Segment load failure (render thread reports these through logs and
    /// the disabled state; control-side loads propagate them directly).
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// A logical music id with no entry in the theme table.
    #[error("unknown music theme: \"{0}\"")]
    UnknownTheme(String),

    /// Audio device or stream setup failure.
    #[error("audio output error: {0}")]
    Output(String),
}
