//! Playback controller
//!
//! Two public types split the control surface from the stream owner.
//! [`MusicSystem`] owns the audio output stream, the settings subscription
//! and the theme table wiring; the stream handle is not `Send`, so the
//! system stays on the thread that created it. [`MusicHandle`] is the
//! cloneable control surface over the shared handoff state; handles are
//! `Send + Sync` and may be used from any number of control threads.

use std::sync::Arc;

use segue_core::{Tags, Theme, ThemeTable};

use crate::error::MusicError;
use crate::output::AudioOutput;
use crate::producer::MusicProducer;
use crate::sequencer::{SegmentStore, Sequencer};
use crate::settings::{
    MUSIC_ENABLED_KEY, MUSIC_VOLUME_KEY, SOUND_SECTION, Settings, SettingsStore, Subscription,
};
use crate::state::MusicShared;

/// Initial sequencer volume, overwritten once settings are applied.
const DEFAULT_VOLUME: f32 = 0.5;

/// Cloneable control surface over a running [`MusicSystem`].
///
/// Handles may be cloned and used from any thread; methods are serialized
/// by the mailbox and take effect on the render thread's next buffer.
#[derive(Clone)]
pub struct MusicHandle {
    shared: Arc<MusicShared>,
    themes: Arc<ThemeTable>,
}

impl MusicHandle {
    pub(crate) fn new(shared: Arc<MusicShared>, themes: Arc<ThemeTable>) -> MusicHandle {
        MusicHandle { shared, themes }
    }

    /// Queue a theme change.
    ///
    /// Returns once the request is queued, not once it is audible; the
    /// handoff completes on the render thread's next buffer.
    pub fn set_music(&self, theme: Theme, tags: Tags) {
        self.shared.mailbox.submit(theme, tags);
    }

    /// Queue a theme change by logical music id, resolved through the
    /// theme table with default tags (day, standard).
    ///
    /// An unknown id returns [`MusicError::UnknownTheme`] and queues
    /// nothing.
    pub fn set_music_id(&self, id: &str) -> Result<(), MusicError> {
        let theme = self
            .themes
            .get(id)
            .ok_or_else(|| MusicError::UnknownTheme(id.to_owned()))?;
        self.set_music(theme.clone(), Tags::combine(Tags::DAY, Tags::STANDARD));
        Ok(())
    }

    /// Enable or disable playback. No-op when already in that state.
    ///
    /// Disabling silences the next rendered buffer even if a reload was
    /// mid-flight; enabling forces a reload of the last requested theme so
    /// playback re-establishes even if the theme never changed.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.set_enabled(enabled);
    }

    /// Equivalent to `set_enabled(false)`.
    pub fn stop_music(&self) {
        self.set_enabled(false);
    }

    /// Force the last requested theme to reload and enable playback,
    /// regardless of the current enabled state.
    pub fn restart_music(&self) {
        self.shared.restart();
    }

    /// Set the master volume directly, independent of the per-theme volume
    /// scaling. Applied before the next rendered buffer.
    pub fn set_volume(&self, volume: f32) {
        self.shared.master_volume.set(volume);
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.is_enabled()
    }

    /// Tags of the most recently applied theme change. Observability only;
    /// nothing in the render core consumes them.
    pub fn current_tags(&self) -> Tags {
        self.shared.current_tags()
    }
}

/// The music playback system.
///
/// Owns the device stream for its lifetime; exactly one render thread
/// exists per system, driven by the audio device. The stream handle is not
/// `Send`, so the system stays on its owning thread. Other threads control
/// playback through [`MusicSystem::handle`].
pub struct MusicSystem {
    handle: MusicHandle,
    // Unsubscribes before the stream tears down.
    _settings_watch: Subscription,
    output: AudioOutput,
}

impl MusicSystem {
    /// Build the system and start the output stream.
    ///
    /// The sequencer must already be created at [`crate::output::OUTPUT_SAMPLE_RATE`].
    /// Construction sets an initial default volume, starts the device with
    /// the producer as its PCM source, then applies the settings-derived
    /// enabled state and volume.
    pub fn new<R, S>(
        mut sequencer: R,
        store: S,
        settings: Arc<Settings>,
        themes: Arc<ThemeTable>,
    ) -> Result<MusicSystem, MusicError>
    where
        R: Sequencer,
        S: SegmentStore<R::Segment>,
    {
        sequencer.set_volume(DEFAULT_VOLUME);

        let shared = Arc::new(MusicShared::new());
        let settings_store: Arc<dyn SettingsStore> = settings.clone();
        let producer = MusicProducer::new(sequencer, store, shared.clone(), settings_store);
        let output = AudioOutput::start(producer)?;

        let watch_shared = Arc::downgrade(&shared);
        let watch_settings = Arc::downgrade(&settings);
        let settings_watch = settings.clone().subscribe(Box::new(move || {
            if let (Some(shared), Some(settings)) =
                (watch_shared.upgrade(), watch_settings.upgrade())
            {
                apply_settings(&shared, settings.as_ref());
            }
        }));

        apply_settings(&shared, settings.as_ref());

        Ok(MusicSystem {
            handle: MusicHandle::new(shared, themes),
            _settings_watch: settings_watch,
            output,
        })
    }

    /// A control surface for this system, freely cloneable across threads.
    pub fn handle(&self) -> MusicHandle {
        self.handle.clone()
    }

    /// See [`MusicHandle::set_music`].
    pub fn set_music(&self, theme: Theme, tags: Tags) {
        self.handle.set_music(theme, tags);
    }

    /// See [`MusicHandle::set_music_id`].
    pub fn set_music_id(&self, id: &str) -> Result<(), MusicError> {
        self.handle.set_music_id(id)
    }

    /// See [`MusicHandle::set_enabled`].
    pub fn set_enabled(&self, enabled: bool) {
        self.handle.set_enabled(enabled);
    }

    /// See [`MusicHandle::stop_music`].
    pub fn stop_music(&self) {
        self.handle.stop_music();
    }

    /// See [`MusicHandle::restart_music`].
    pub fn restart_music(&self) {
        self.handle.restart_music();
    }

    /// See [`MusicHandle::set_volume`].
    pub fn set_volume(&self, volume: f32) {
        self.handle.set_volume(volume);
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_enabled()
    }

    /// See [`MusicHandle::current_tags`].
    pub fn current_tags(&self) -> Tags {
        self.handle.current_tags()
    }

    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate()
    }
}

/// Apply the settings-derived enabled state and master volume. Runs at
/// construction and on every settings-change notification.
pub(crate) fn apply_settings(shared: &MusicShared, settings: &dyn SettingsStore) {
    let enabled = settings.get_int(SOUND_SECTION, MUSIC_ENABLED_KEY) != 0;
    shared.set_enabled(enabled);
    shared
        .master_volume
        .set(settings.get_float(SOUND_SECTION, MUSIC_VOLUME_KEY));
}
