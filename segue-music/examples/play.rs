//! Minimal playable demo.
//!
//! A sine-wave "sequencer" stands in for a real segment mixer: every
//! composition file maps to a pitch, and switching themes retunes the tone.
//! Run with `RUST_LOG=debug` to watch the handoff decisions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use segue_core::{Embellishment, Tags, Theme, ThemeTable, Timing};
use segue_music::output::OUTPUT_SAMPLE_RATE;
use segue_music::{MusicSystem, SegmentError, SegmentStore, Sequencer, Settings};
use tracing::info;

struct Tone {
    frequency: f32,
}

struct SineSequencer {
    phase: f32,
    frequency: f32,
    volume: f32,
}

impl Sequencer for SineSequencer {
    type Segment = Tone;

    fn render(&mut self, out: &mut [f32]) {
        let step = self.frequency * std::f32::consts::TAU / OUTPUT_SAMPLE_RATE as f32;
        for frame in out.chunks_exact_mut(2) {
            let sample = if self.frequency > 0.0 {
                self.phase.sin() * self.volume * 0.2
            } else {
                0.0
            };
            frame[0] = sample;
            frame[1] = sample;
            self.phase = (self.phase + step) % std::f32::consts::TAU;
        }
    }

    fn play_transition(&mut self, segment: &Tone, _: Embellishment, _: Timing) {
        self.frequency = segment.frequency;
    }

    fn play_segment(&mut self, segment: Option<&Tone>, _: Timing) {
        self.frequency = segment.map_or(0.0, |tone| tone.frequency);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

struct ToneStore {
    tones: HashMap<&'static str, f32>,
}

impl SegmentStore<Tone> for ToneStore {
    fn load(&mut self, file: &str) -> Result<Tone, SegmentError> {
        self.tones
            .get(file)
            .map(|&frequency| Tone { frequency })
            .ok_or_else(|| SegmentError::NotFound(file.to_owned()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let themes = ThemeTable::from_toml_str(
        r#"
        [themes.OWD_DAY_STD]
        file = "owd_day.sgt"
        transition = "groove"
        timing = "beat"
        volume = 0.8

        [themes.OWD_NIGHT_STD]
        file = "owd_night.sgt"
        transition = "intro"
        timing = "measure"
        "#,
    )?;

    let store = ToneStore {
        tones: HashMap::from([
            ("owd_day.sgt", 220.0),
            ("owd_night.sgt", 174.6),
            ("battle.sgt", 329.6),
        ]),
    };

    let sequencer = SineSequencer {
        phase: 0.0,
        frequency: 0.0,
        volume: 0.0,
    };

    let settings = Arc::new(Settings::new());
    let music = MusicSystem::new(sequencer, store, settings, Arc::new(themes))?;

    info!("day theme");
    music.set_music_id("OWD_DAY_STD")?;
    std::thread::sleep(Duration::from_secs(2));

    info!("night theme");
    music.set_music_id("owd_night_std")?;
    std::thread::sleep(Duration::from_secs(2));

    info!("combat, via an ad-hoc theme from another thread");
    let handle = music.handle();
    std::thread::spawn(move || {
        handle.set_music(
            Theme::new("battle.sgt"),
            Tags::combine(Tags::NIGHT, Tags::COMBAT),
        );
    })
    .join()
    .expect("control thread");
    std::thread::sleep(Duration::from_secs(2));

    info!("stop and restart");
    music.stop_music();
    std::thread::sleep(Duration::from_secs(1));
    music.restart_music();
    std::thread::sleep(Duration::from_secs(2));

    Ok(())
}
