//! Microphone capture through cpal.

use super::audio::f32_to_i16;
use super::{AudioCapture, AudioClip};
use crate::error::{GenanimlError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Default input device, recording fixed-length phrases.
pub struct Microphone {
    phrase_time_limit: Duration,
    sample_rate: u32,
}

impl Microphone {
    /// Record phrases of `phrase_time_limit`, delivered mono at `sample_rate`.
    pub fn new(phrase_time_limit: Duration, sample_rate: u32) -> Self {
        Self {
            phrase_time_limit,
            sample_rate,
        }
    }

    /// Check that an input device exists.
    pub fn is_available() -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}

impl AudioCapture for Microphone {
    fn capture_phrase(&self) -> Result<AudioClip> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| GenanimlError::Audio("No input device available".to_string()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| GenanimlError::Audio(format!("No input config: {}", e)))?;

        let device_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let format = supported.sample_format();
        let config = supported.config();

        let buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();
        let on_error = |e: cpal::StreamError| warn!("Input stream error: {}", e);

        let stream = match format {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend(data.iter().map(|s| f32_to_i16(*s)));
                    }
                },
                on_error,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                on_error,
                None,
            ),
            cpal::SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend(data.iter().map(|s| (*s as i32 - 32_768) as i16));
                    }
                },
                on_error,
                None,
            ),
            other => {
                return Err(GenanimlError::Audio(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| GenanimlError::Audio(format!("Failed to open input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| GenanimlError::Audio(format!("Failed to start recording: {}", e)))?;
        std::thread::sleep(self.phrase_time_limit);
        drop(stream);

        let interleaved = buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .map_err(|_| GenanimlError::Audio("Capture buffer poisoned".to_string()))?;

        let mono = downmix(&interleaved, channels);
        let samples = resample(&mono, device_rate, self.sample_rate);
        debug!("Captured {} samples at {} Hz", samples.len(), self.sample_rate);

        Ok(AudioClip::new(samples, self.sample_rate, 1))
    }
}

/// Average interleaved channels into one.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|frame| (frame.iter().map(|s| *s as i32).sum::<i32>() / frame.len() as i32) as i16)
        .collect()
}

/// Linear-interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() || to_rate == 0 {
        return samples.to_vec();
    }
    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = pos - idx as f64;
            let a = samples[idx] as f64;
            let b = samples.get(idx + 1).copied().unwrap_or(samples[idx]) as f64;
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}
