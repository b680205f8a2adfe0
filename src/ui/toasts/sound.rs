// SPDX-License-Identifier: MPL-2.0
//! Audible cues played when a toast appears.
//!
//! Each severity has a short note sequence. [`Chime`] renders it to PCM and
//! plays it through the default `cpal` output device on a background
//! thread; [`Muted`] does nothing.

use super::toast::Severity;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Length of each note.
const NOTE_DURATION: Duration = Duration::from_millis(300);

/// Delay between the start of consecutive notes.
const NOTE_STAGGER: Duration = Duration::from_millis(100);

/// Peak amplitude of a note.
const NOTE_GAIN: f32 = 0.1;

/// Amplitude a note decays to by its end.
const NOTE_FLOOR: f32 = 0.01;

/// Plays the cue for a severity.
pub trait SoundCue: fmt::Debug {
    /// Starts playback without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error when playback cannot be started at all.
    fn play(&self, severity: Severity) -> Result<()>;
}

/// Silent cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl SoundCue for Muted {
    fn play(&self, _severity: Severity) -> Result<()> {
        Ok(())
    }
}

/// Note frequencies in Hz for a severity.
#[must_use]
pub fn notes(severity: Severity) -> &'static [f32] {
    match severity {
        Severity::Success => &[523.25, 659.25, 783.99], // C5 E5 G5
        Severity::Error => &[220.0, 277.18],            // A3 C#4
        Severity::Warning => &[440.0, 554.37],          // A4 C#5
        Severity::Info | Severity::Neutral => &[523.25, 698.46], // C5 F5
    }
}

/// Total length of a rendered note sequence.
#[must_use]
pub fn sequence_duration(note_count: usize) -> Duration {
    match note_count {
        0 => Duration::ZERO,
        n => NOTE_STAGGER * (n as u32 - 1) + NOTE_DURATION,
    }
}

/// Renders a note sequence to interleaved `f32` samples.
///
/// Notes start `NOTE_STAGGER` apart, last `NOTE_DURATION` and decay
/// exponentially from `NOTE_GAIN` to `NOTE_FLOOR`; overlapping notes mix.
#[must_use]
pub fn render(notes: &[f32], sample_rate: u32, channels: u16) -> Vec<f32> {
    let rate = sample_rate as f32;
    let frames = (sequence_duration(notes.len()).as_secs_f32() * rate).ceil() as usize;
    let note_frames = (NOTE_DURATION.as_secs_f32() * rate) as usize;
    let stagger_frames = (NOTE_STAGGER.as_secs_f32() * rate) as usize;
    let decay = (NOTE_FLOOR / NOTE_GAIN).ln() / note_frames.max(1) as f32;

    let mut mono = vec![0.0f32; frames];
    for (i, freq) in notes.iter().enumerate() {
        let start = i * stagger_frames;
        for n in 0..note_frames {
            let Some(slot) = mono.get_mut(start + n) else {
                break;
            };
            let t = n as f32 / rate;
            let envelope = NOTE_GAIN * (decay * n as f32).exp();
            *slot += envelope * (std::f32::consts::TAU * freq * t).sin();
        }
    }

    let channels = usize::from(channels.max(1));
    mono.into_iter()
        .flat_map(|sample| std::iter::repeat_n(sample, channels))
        .collect()
}

/// Plays cues through the default audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Chime;

impl SoundCue for Chime {
    fn play(&self, severity: Severity) -> Result<()> {
        let notes = notes(severity);
        std::thread::Builder::new()
            .name("toast-chime".to_string())
            .spawn(move || {
                if let Err(err) = play_blocking(notes) {
                    tracing::debug!(error = %err, "toast sound unavailable");
                }
            })
            .map(drop)
            .map_err(|e| Error::Io(format!("Failed to start sound thread: {e}")))
    }
}

/// Opens the default device, plays the notes and waits for them to finish.
fn play_blocking(notes: &[f32]) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Io("No audio output device found".to_string()))?;

    let supported_config = device
        .default_output_config()
        .map_err(|e| Error::Io(format!("Failed to get audio config: {e}")))?;

    let sample_rate = supported_config.sample_rate();
    let channels = supported_config.channels();
    let samples = Arc::new(Mutex::new(render(notes, sample_rate.0, channels)));

    let stream = match supported_config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &supported_config.into(), samples)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &supported_config.into(), samples)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &supported_config.into(), samples)?,
        _ => return Err(Error::Io("Unsupported audio sample format".to_string())),
    };

    stream
        .play()
        .map_err(|e| Error::Io(format!("Failed to start audio stream: {e}")))?;

    // Keep the stream alive until the tail has drained.
    std::thread::sleep(sequence_duration(notes.len()) + Duration::from_millis(100));
    Ok(())
}

fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<Mutex<Vec<f32>>>,
) -> Result<cpal::Stream> {
    let mut cursor = 0usize;
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let Ok(buf) = samples.lock() else {
                    data.fill(T::from_sample(0.0f32));
                    return;
                };
                for sample in data.iter_mut() {
                    let value = buf.get(cursor).copied().unwrap_or(0.0);
                    *sample = T::from_sample(value.clamp(-1.0, 0.999_999_9));
                    cursor += 1;
                }
            },
            |err| {
                tracing::debug!(error = %err, "toast sound stream error");
            },
            None,
        )
        .map_err(|e| Error::Io(format!("Failed to build audio stream: {e}")))
}
