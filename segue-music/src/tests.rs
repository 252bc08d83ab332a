//! Scenario tests for the handoff between control side and render callback
//!
//! The producer is driven directly (no audio device); stub collaborators
//! record every sequencer mutation so the tests can assert exactly what a
//! render cycle did.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use segue_core::{
    Embellishment, Tags, Theme, ThemeTable, Timing, TransitionEffect, TransitionTiming,
};

use crate::error::{MusicError, SegmentError};
use crate::producer::MusicProducer;
use crate::sequencer::{SegmentStore, Sequencer};
use crate::settings::{MUSIC_ENABLED_KEY, MUSIC_VOLUME_KEY, SOUND_SECTION, Settings, SettingsStore};
use crate::state::MusicShared;
use crate::system::{MusicHandle, apply_settings};

/// A sequencer mutation observed by the stub.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Transition(String, Embellishment, Timing),
    Segment(Option<String>, Timing),
    Volume(f32),
}

#[derive(Default)]
struct SequencerLog {
    calls: Vec<Call>,
    /// Currently scheduled segment; `None` renders silence.
    active: Option<String>,
    volume: f32,
}

struct StubSegment(String);

struct StubSequencer {
    log: Arc<Mutex<SequencerLog>>,
}

impl Sequencer for StubSequencer {
    type Segment = StubSegment;

    fn render(&mut self, out: &mut [f32]) {
        let log = self.log.lock().unwrap();
        let level = if log.active.is_some() { 0.25 } else { 0.0 };
        out.fill(level);
    }

    fn play_transition(
        &mut self,
        segment: &StubSegment,
        embellishment: Embellishment,
        timing: Timing,
    ) {
        let mut log = self.log.lock().unwrap();
        log.active = Some(segment.0.clone());
        log.calls
            .push(Call::Transition(segment.0.clone(), embellishment, timing));
    }

    fn play_segment(&mut self, segment: Option<&StubSegment>, timing: Timing) {
        let mut log = self.log.lock().unwrap();
        log.active = segment.map(|s| s.0.clone());
        log.calls
            .push(Call::Segment(segment.map(|s| s.0.clone()), timing));
    }

    fn set_volume(&mut self, volume: f32) {
        let mut log = self.log.lock().unwrap();
        log.volume = volume;
        log.calls.push(Call::Volume(volume));
    }
}

struct StubStore {
    fail: Option<SegmentError>,
    loads: Arc<AtomicUsize>,
}

impl SegmentStore<StubSegment> for StubStore {
    fn load(&mut self, file: &str) -> Result<StubSegment, SegmentError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.fail {
            Some(err) => Err(err.clone()),
            None => Ok(StubSegment(file.to_owned())),
        }
    }
}

/// Producer plus handles to everything the tests observe.
struct Rig {
    producer: MusicProducer<StubSequencer, StubStore>,
    shared: Arc<MusicShared>,
    settings: Arc<Settings>,
    log: Arc<Mutex<SequencerLog>>,
    loads: Arc<AtomicUsize>,
}

impl Rig {
    fn new() -> Rig {
        Rig::with_store_failure(None)
    }

    fn with_store_failure(fail: Option<SegmentError>) -> Rig {
        let log = Arc::new(Mutex::new(SequencerLog::default()));
        let loads = Arc::new(AtomicUsize::new(0));
        let shared = Arc::new(MusicShared::new());
        let settings = Arc::new(Settings::new());

        let settings_store: Arc<dyn SettingsStore> = settings.clone();
        let producer = MusicProducer::new(
            StubSequencer { log: log.clone() },
            StubStore {
                fail,
                loads: loads.clone(),
            },
            shared.clone(),
            settings_store,
        );

        Rig {
            producer,
            shared,
            settings,
            log,
            loads,
        }
    }

    /// One render callback invocation for 64 stereo frames. The buffer is
    /// seeded with a sentinel so silence is distinguishable from "never
    /// written".
    fn render(&mut self) -> Vec<f32> {
        let mut buffer = vec![1.0; 128];
        self.producer.render(&mut buffer);
        buffer
    }

    fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().calls.clone()
    }

    fn applied_volume(&self) -> f32 {
        self.log.lock().unwrap().volume
    }

    fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

fn groove_theme(file: &str, volume: f32) -> Theme {
    Theme {
        file: file.to_owned(),
        transition: TransitionEffect::Groove,
        timing: TransitionTiming::Beat,
        volume,
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn reload_maps_vocabulary_and_scales_volume() {
    // Theme "T1", GROOVE/BEAT, vol 0.8; settings volume 0.5 (default)
    let mut rig = Rig::new();
    let tags = Tags::combine(Tags::NIGHT, Tags::COMBAT);
    rig.shared.mailbox.submit(groove_theme("T1", 0.8), tags);

    rig.render();

    assert_eq!(rig.load_count(), 1);
    let calls = rig.calls();
    assert_eq!(
        calls[0],
        Call::Transition("T1".into(), Embellishment::Groove, Timing::Beat)
    );
    assert!(approx(rig.applied_volume(), 0.4));
    assert_eq!(rig.shared.current_tags(), tags);
}

#[test]
fn retarget_without_reload_only_adjusts_volume() {
    let mut rig = Rig::new();
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();

    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.6), Tags::default());
    rig.render();

    assert_eq!(rig.load_count(), 1, "same file must not reload");
    assert!(approx(rig.applied_volume(), 0.3));
    let transitions = rig
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Transition(..)))
        .count();
    assert_eq!(transitions, 1);
}

#[test]
fn applied_volume_tracks_settings_between_applications() {
    let mut rig = Rig::new();
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();
    assert!(approx(rig.applied_volume(), 0.4));

    rig.settings.set_float(SOUND_SECTION, MUSIC_VOLUME_KEY, 0.25);
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();
    assert!(approx(rig.applied_volume(), 0.2));
}

#[test]
fn load_failure_degrades_to_disabled_silence() {
    let mut rig =
        Rig::with_store_failure(Some(SegmentError::NotFound("missing.sgt".into())));
    rig.shared
        .mailbox
        .submit(groove_theme("missing.sgt", 0.8), Tags::default());

    let buffer = rig.render();

    assert!(!rig.shared.is_enabled());
    assert!(buffer.iter().all(|&s| s == 0.0));
    let calls = rig.calls();
    assert_eq!(calls, vec![Call::Segment(None, Timing::Measure)]);

    // No automatic retry on later cycles.
    rig.render();
    assert_eq!(rig.load_count(), 1);
}

#[test]
fn allocation_failure_is_contained_the_same_way() {
    let mut rig =
        Rig::with_store_failure(Some(SegmentError::Allocation("big.sgt".into())));
    rig.shared
        .mailbox
        .submit(groove_theme("big.sgt", 0.8), Tags::default());

    rig.render();

    assert!(!rig.shared.is_enabled());
    assert_eq!(rig.calls(), vec![Call::Segment(None, Timing::Measure)]);
}

#[test]
fn disabled_playback_skips_pending_updates() {
    let mut rig = Rig::new();
    rig.shared.set_enabled(false);
    rig.render();

    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();

    assert_eq!(rig.load_count(), 0);
    // The request stays queued for a later enable.
    assert!(rig.shared.mailbox.take_if_any().is_some());
}

#[test]
fn stop_silences_next_buffer_even_mid_reload() {
    let mut rig = Rig::new();
    rig.shared
        .mailbox
        .submit(groove_theme("T2", 0.8), Tags::default());
    rig.shared.set_enabled(false);

    let buffer = rig.render();

    assert!(!rig.shared.is_enabled());
    assert_eq!(rig.load_count(), 0, "pending reload must not run");
    assert!(buffer.iter().all(|&s| s == 0.0));
    assert_eq!(rig.calls(), vec![Call::Segment(None, Timing::Measure)]);
}

#[test]
fn reenable_forces_reload_of_unchanged_theme() {
    let mut rig = Rig::new();
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();
    assert_eq!(rig.load_count(), 1);

    rig.shared.set_enabled(false);
    rig.render();

    rig.shared.set_enabled(true);
    rig.render();

    assert_eq!(rig.load_count(), 2, "re-enable must reload the same file");
}

#[test]
fn set_enabled_is_noop_when_state_unchanged() {
    let mut rig = Rig::new();
    rig.shared.set_enabled(true);
    rig.render();
    assert!(rig.calls().is_empty(), "no mutation for a no-op enable");

    rig.shared.set_enabled(false);
    rig.shared.set_enabled(false);
    rig.render();
    rig.render();
    let stops = rig
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Segment(None, _)))
        .count();
    assert_eq!(stops, 1, "repeated disable must not re-issue silence");
}

#[test]
fn restart_reenables_and_reloads() {
    let mut rig = Rig::new();
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();

    rig.shared.set_enabled(false);
    rig.render();

    rig.shared.restart();
    assert!(rig.shared.is_enabled());
    rig.render();
    assert_eq!(rig.load_count(), 2);
}

#[test]
fn master_volume_applies_before_the_next_render() {
    let mut rig = Rig::new();
    rig.shared.master_volume.set(0.9);
    rig.render();
    assert!(approx(rig.applied_volume(), 0.9));
}

#[test]
fn theme_volume_wins_over_master_volume_in_same_cycle() {
    let mut rig = Rig::new();
    rig.shared.master_volume.set(0.9);
    rig.shared
        .mailbox
        .submit(groove_theme("T1", 0.8), Tags::default());
    rig.render();

    // Master write applied first, theme-derived volume last.
    assert!(approx(rig.applied_volume(), 0.4));
}

#[test]
fn render_always_fills_the_buffer() {
    let mut rig = Rig::new();
    let buffer = rig.render();
    assert!(buffer.iter().all(|&s| s == 0.0), "idle cycle renders silence");
}

#[test]
fn settings_application_disables_and_sets_volume() {
    let mut rig = Rig::new();
    rig.settings.set_int(SOUND_SECTION, MUSIC_ENABLED_KEY, 0);
    rig.settings.set_float(SOUND_SECTION, MUSIC_VOLUME_KEY, 0.7);
    apply_settings(&rig.shared, rig.settings.as_ref());

    assert!(!rig.shared.is_enabled());
    rig.render();
    assert!(approx(rig.applied_volume(), 0.7));
    assert!(
        rig.calls().contains(&Call::Segment(None, Timing::Measure)),
        "disable through settings silences playback"
    );
}

fn handle_with_themes(rig: &Rig) -> MusicHandle {
    let mut themes = ThemeTable::new();
    themes.insert("OWD_DAY_STD", groove_theme("owd_day.sgt", 0.8));
    MusicHandle::new(rig.shared.clone(), Arc::new(themes))
}

#[test]
fn control_handle_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MusicHandle>();
}

#[test]
fn handle_controls_playback_from_another_thread() {
    let mut rig = Rig::new();
    let handle = handle_with_themes(&rig);

    let worker = handle.clone();
    std::thread::spawn(move || {
        worker.set_music_id("OWD_DAY_STD").expect("known id");
    })
    .join()
    .expect("control thread");

    rig.render();
    assert_eq!(rig.load_count(), 1);
    assert!(handle.is_enabled());
}

#[test]
fn known_theme_id_resolves_with_default_tags() {
    let rig = Rig::new();
    let handle = handle_with_themes(&rig);

    handle.set_music_id("owd_day_std").expect("known id");

    let request = rig.shared.mailbox.take_if_any().expect("pending request");
    assert_eq!(request.theme.file, "owd_day.sgt");
    assert_eq!(request.tags, Tags::combine(Tags::DAY, Tags::STANDARD));
}

#[test]
fn unknown_theme_id_leaves_mailbox_empty() {
    let rig = Rig::new();
    let handle = handle_with_themes(&rig);

    let err = handle.set_music_id("SYS_MENU").expect_err("unknown id");
    assert!(matches!(err, MusicError::UnknownTheme(id) if id == "SYS_MENU"));
    assert!(rig.shared.mailbox.take_if_any().is_none());
}

#[test]
fn settings_subscription_drives_enabled_state() {
    // Mirrors the wiring MusicSystem::new sets up, without a device.
    let rig = Rig::new();
    let shared = Arc::downgrade(&rig.shared);
    let settings = Arc::downgrade(&rig.settings);
    let _watch = rig.settings.clone().subscribe(Box::new(move || {
        if let (Some(shared), Some(settings)) = (shared.upgrade(), settings.upgrade()) {
            apply_settings(&shared, settings.as_ref());
        }
    }));

    rig.settings.set_int(SOUND_SECTION, MUSIC_ENABLED_KEY, 0);
    assert!(!rig.shared.is_enabled());

    rig.settings.set_int(SOUND_SECTION, MUSIC_ENABLED_KEY, 1);
    assert!(rig.shared.is_enabled());
}
