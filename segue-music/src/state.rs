//! State shared between the control surface and the render callback

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use segue_core::Tags;

use crate::mailbox::ThemeMailbox;

/// Master-volume cell.
///
/// The control thread writes immediately; the render callback applies the
/// value to the sequencer before the next buffer. A sequencer volume change
/// is only audible at the next render anyway, so this preserves the
/// "writes take effect right away" contract without sharing the sequencer
/// across threads.
pub(crate) struct VolumeCell {
    bits: AtomicU32,
    dirty: AtomicBool,
}

impl VolumeCell {
    fn new() -> VolumeCell {
        VolumeCell {
            bits: AtomicU32::new(0.0f32.to_bits()),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn set(&self, volume: f32) {
        self.bits.store(volume.to_bits(), Ordering::Release);
        self.dirty.store(true, Ordering::Release);
    }

    /// Consume the pending write, if any. Render-thread side.
    pub fn take(&self) -> Option<f32> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(f32::from_bits(self.bits.load(Ordering::Acquire)))
        } else {
            None
        }
    }
}

/// Hub owned jointly by the [`MusicSystem`](crate::MusicSystem) surface and
/// the render callback.
///
/// Everything here is atomically observable from any thread; the theme and
/// tags being *applied* live inside the producer on the render thread, only
/// the applied tags are mirrored out through `current_tags`.
pub(crate) struct MusicShared {
    pub mailbox: ThemeMailbox,
    pub enabled: AtomicBool,
    pub current_tags: AtomicU8,
    pub master_volume: VolumeCell,
}

impl MusicShared {
    pub fn new() -> MusicShared {
        MusicShared {
            mailbox: ThemeMailbox::new(),
            enabled: AtomicBool::new(true),
            current_tags: AtomicU8::new(Tags::default().bits()),
            master_volume: VolumeCell::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn current_tags(&self) -> Tags {
        Tags::from_bits(self.current_tags.load(Ordering::Acquire))
    }

    /// Enable or disable playback. No-op when already in that state.
    ///
    /// Enabling re-marks the last requested theme with a forced reload so
    /// the next render cycle re-establishes playback; disabling flags an
    /// immediate silence transition regardless of any pending reload.
    pub fn set_enabled(&self, enabled: bool) {
        if self.is_enabled() == enabled {
            return;
        }
        if enabled {
            self.mailbox.force_reload_on_next_enable();
            self.enabled.store(true, Ordering::Release);
        } else {
            self.enabled.store(false, Ordering::Release);
            self.mailbox.request_stop();
        }
    }

    /// Re-establish the last requested theme and enable playback.
    pub fn restart(&self) {
        self.mailbox.force_reload_on_next_enable();
        self.enabled.store(true, Ordering::Release);
    }
}
