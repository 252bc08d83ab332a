//! Audio output using cpal
//!
//! Opens the default output device at 44.1 kHz stereo and drives a
//! [`PcmSource`] from the device's callback thread. The source renders f32
//! samples; i16/u16 devices get a conversion pass through a reused scratch
//! buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error};

use crate::error::MusicError;

/// Output sample rate (44.1 kHz - native for most hardware).
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

/// Stereo output.
pub const OUTPUT_CHANNELS: u16 = 2;

/// A PCM producer driven by the audio device, one buffer at a time.
///
/// Invoked on the device's own thread; implementations must not block for
/// an unbounded duration.
pub trait PcmSource: Send + 'static {
    /// Fill `out` with interleaved stereo f32 samples.
    fn render(&mut self, out: &mut [f32]);
}

/// Audio output stream driving a [`PcmSource`].
pub struct AudioOutput {
    /// The cpal stream (kept alive for the duration)
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the default output device and start pulling from `source`.
    ///
    /// The stream starts immediately and runs until the output is dropped;
    /// whether anything is audible is up to the source.
    pub fn start<P: PcmSource>(mut source: P) -> Result<Self, MusicError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| MusicError::Output("no audio output device available".into()))?;

        let sample_format = device
            .default_output_config()
            .map_err(|e| MusicError::Output(format!("failed to get default output config: {e}")))?
            .sample_format();

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS,
            sample_rate: cpal::SampleRate(OUTPUT_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err| error!("audio stream error: {err}");

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        source.render(data);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| MusicError::Output(format!("failed to build audio stream: {e}")))?,
            cpal::SampleFormat::I16 => {
                let mut scratch: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0.0);
                            }
                            source.render(&mut scratch[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&scratch) {
                                *out = (f * 32767.0).clamp(-32768.0, 32767.0) as i16;
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| MusicError::Output(format!("failed to build audio stream: {e}")))?
            }
            cpal::SampleFormat::U16 => {
                let mut scratch: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                            if scratch.len() < data.len() {
                                scratch.resize(data.len(), 0.0);
                            }
                            source.render(&mut scratch[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&scratch) {
                                *out = ((f * 32767.0 + 32768.0).clamp(0.0, 65535.0)) as u16;
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| MusicError::Output(format!("failed to build audio stream: {e}")))?
            }
            other => {
                return Err(MusicError::Output(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| MusicError::Output(format!("failed to play audio stream: {e}")))?;

        debug!("music output stream started");

        Ok(AudioOutput {
            _stream: stream,
            sample_rate: OUTPUT_SAMPLE_RATE,
        })
    }

    /// Output sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
