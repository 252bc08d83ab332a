//! Single-slot theme handoff mailbox
//!
//! Hands theme changes from control threads to the render thread. The slot
//! holds at most one outstanding request: a rapid sequence of control-side
//! writes before the render thread consumes collapses to the most recent
//! write, no history is kept. Both sides hold the lock only for O(1) copies
//! of a fixed-size snapshot, which keeps the render thread's wait bounded.

use std::sync::{Mutex, MutexGuard, PoisonError};

use segue_core::{Tags, Theme};

/// A theme change waiting for the render thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    /// Immutable-at-handoff copy of the theme descriptor.
    pub theme: Theme,
    /// Requested playback context, recorded for external queries.
    pub tags: Tags,
    /// Whether the composition file must be swapped, or only volume and
    /// tags retargeted.
    pub reload: bool,
}

#[derive(Default)]
struct Slot {
    pending: Option<PendingRequest>,
    last_requested: Option<(Theme, Tags)>,
    stop_requested: bool,
}

/// Mutex-guarded mailbox holding at most one outstanding theme change.
#[derive(Default)]
pub struct ThemeMailbox {
    slot: Mutex<Slot>,
}

impl ThemeMailbox {
    pub fn new() -> ThemeMailbox {
        ThemeMailbox::default()
    }

    /// Queue a theme change, superseding any unconsumed one.
    ///
    /// `reload` is computed against the previously *requested* file, not
    /// the currently playing one: a request that supersedes an unconsumed
    /// request still compares against that request's file.
    pub fn submit(&self, theme: Theme, tags: Tags) {
        let mut slot = self.lock();
        let reload = slot
            .last_requested
            .as_ref()
            .is_none_or(|(last, _)| last.file != theme.file);
        slot.pending = Some(PendingRequest {
            theme: theme.clone(),
            tags,
            reload,
        });
        slot.last_requested = Some((theme, tags));
    }

    /// Re-mark the last requested theme pending with `reload` forced, so
    /// the next render cycle re-establishes playback even if the theme file
    /// never changed. Used when resuming from the disabled state. No-op if
    /// no theme was ever requested.
    pub fn force_reload_on_next_enable(&self) {
        let mut slot = self.lock();
        if let Some((theme, tags)) = slot.last_requested.clone() {
            slot.pending = Some(PendingRequest {
                theme,
                tags,
                reload: true,
            });
        }
    }

    /// Render-thread side: atomically take the pending request, if any.
    pub fn take_if_any(&self) -> Option<PendingRequest> {
        self.lock().pending.take()
    }

    /// Flag an immediate silence transition for the next render cycle.
    pub fn request_stop(&self) {
        self.lock().stop_requested = true;
    }

    /// Render-thread side: consume the stop flag, if set.
    pub fn take_stop(&self) -> bool {
        std::mem::take(&mut self.lock().stop_requested)
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
