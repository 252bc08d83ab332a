//! Segue music playback system
//!
//! Coordinates a non-real-time producer (theme changes driven by game
//! state) with a real-time consumer (the audio device's PCM callback)
//! without stalling either side. Per theme change it decides whether to
//! hot-swap the underlying composition (reload) or merely retarget volume
//! and tags without interrupting the current segment.
//!
//! # Architecture
//!
//! ```text
//! Control Thread(s)                 Render Thread (cpal callback)
//!       │                                    │
//! [set_music / set_enabled]                  │
//!       │                                    │
//! [ThemeMailbox]──────(single slot)────►[take stop / pending]
//!       │                               [reload or retarget sequencer]
//!       │                               [sequencer.render]──►[device buffer]
//! ```
//!
//! The [`MusicSystem`] owns the device stream and stays on its creating
//! thread; any number of control threads drive playback through cloned
//! [`MusicHandle`]s. The mailbox holds at most one outstanding request; a
//! burst of control thread writes collapses to the most recent one. Segment decoding and all
//! sequencer mutation happen on the render thread; the two control-side
//! fast paths (stop, master volume) are one-shot atomic cells the callback
//! consumes before rendering.
//!
//! Segment decoding, the sequencer itself and settings persistence are
//! external collaborators, consumed through the traits in [`sequencer`] and
//! [`settings`].

pub mod error;
pub mod mailbox;
pub mod output;
pub mod producer;
pub mod sequencer;
pub mod settings;
mod state;
pub mod system;

pub use error::{MusicError, SegmentError};
pub use mailbox::ThemeMailbox;
pub use output::AudioOutput;
pub use producer::MusicProducer;
pub use sequencer::{SegmentStore, Sequencer};
pub use settings::{Settings, SettingsStore, Subscription};
pub use system::{MusicHandle, MusicSystem};

#[cfg(test)]
mod tests;
