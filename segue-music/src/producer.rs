//! Render-thread side of the theme handoff
//!
//! The producer is invoked by the audio output for every buffer it needs.
//! Each invocation drains the control-side requests (stop, master volume,
//! pending theme change), mutates the sequencer accordingly, then always
//! pulls the next chunk of PCM. There is no persistent state machine: each
//! callback re-evaluates from scratch.
//!
//! Segment failures are fully contained here. A panic or error escaping
//! into the audio callback would take the process down, so a failed reload
//! logs the offending file and degrades playback to the disabled state
//! instead; a later `set_music`/`set_enabled(true)` from the control side
//! is required to resume.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, error};

use segue_core::{Timing, embellishment_for, timing_for};

use crate::error::SegmentError;
use crate::mailbox::PendingRequest;
use crate::output::PcmSource;
use crate::sequencer::{SegmentStore, Sequencer};
use crate::settings::{MUSIC_VOLUME_KEY, SOUND_SECTION, SettingsStore};
use crate::state::MusicShared;

/// PCM source wired into the audio output; owns the sequencer and the
/// segment store for the lifetime of the stream.
pub struct MusicProducer<R, S>
where
    R: Sequencer,
    S: SegmentStore<R::Segment>,
{
    sequencer: R,
    store: S,
    shared: Arc<MusicShared>,
    settings: Arc<dyn SettingsStore>,
}

impl<R, S> MusicProducer<R, S>
where
    R: Sequencer,
    S: SegmentStore<R::Segment>,
{
    pub(crate) fn new(
        sequencer: R,
        store: S,
        shared: Arc<MusicShared>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        MusicProducer {
            sequencer,
            store,
            shared,
            settings,
        }
    }

    /// One render cycle: drain control-side requests, then fill `out`.
    ///
    /// The final render is the only step guaranteed to run every
    /// invocation; it never fails.
    pub fn render(&mut self, out: &mut [f32]) {
        self.apply_updates();
        self.sequencer.render(out);
    }

    fn apply_updates(&mut self) {
        if self.shared.mailbox.take_stop() {
            self.sequencer.play_segment(None, Timing::Measure);
        }
        if let Some(volume) = self.shared.master_volume.take() {
            self.sequencer.set_volume(volume);
        }
        if !self.shared.enabled.load(Ordering::Acquire) {
            return;
        }
        let Some(request) = self.shared.mailbox.take_if_any() else {
            return;
        };
        if let Err(err) = self.apply(&request) {
            error!(
                "unable to load music segment \"{}\": {err}",
                request.theme.file
            );
            // Degrade to silence; no automatic retry.
            self.shared.enabled.store(false, Ordering::Release);
            self.sequencer.play_segment(None, Timing::Measure);
        }
    }

    fn apply(&mut self, request: &PendingRequest) -> Result<(), SegmentError> {
        if request.reload {
            let segment = self.store.load(&request.theme.file)?;
            let embellishment = embellishment_for(request.theme.transition);
            let timing = timing_for(request.theme.timing);
            debug!(
                file = %request.theme.file,
                ?embellishment,
                ?timing,
                "transitioning music segment"
            );
            self.sequencer
                .play_transition(&segment, embellishment, timing);
            // The loader's temporary handle drops here; the sequencer holds
            // its own reference to the segment.
        }

        // The settings volume is read fresh on every application, so a
        // settings change between two applications of the same theme is
        // picked up.
        let master = self.settings.get_float(SOUND_SECTION, MUSIC_VOLUME_KEY);
        self.sequencer.set_volume(request.theme.volume * master);

        self.shared
            .current_tags
            .store(request.tags.bits(), Ordering::Release);
        Ok(())
    }
}

impl<R, S> PcmSource for MusicProducer<R, S>
where
    R: Sequencer,
    S: SegmentStore<R::Segment>,
{
    fn render(&mut self, out: &mut [f32]) {
        MusicProducer::render(self, out);
    }
}
