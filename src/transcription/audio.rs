//! In-memory audio clips.

use crate::error::{GenanimlError, Result};
use std::io::Cursor;

/// A mono-or-interleaved 16-bit PCM clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Decode a WAV buffer. Integer samples of any bit depth and float samples
    /// are rescaled to 16 bits.
    pub fn from_wav(bytes: &[u8]) -> Result<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        let samples: Vec<i16> = match spec.sample_format {
            hound::SampleFormat::Int if spec.bits_per_sample == 16 => {
                reader.samples::<i16>().collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let shift = spec.bits_per_sample as i32 - 16;
                reader
                    .samples::<i32>()
                    .map(|s| {
                        s.map(|v| {
                            if shift >= 0 {
                                (v >> shift) as i16
                            } else {
                                (v << -shift) as i16
                            }
                        })
                    })
                    .collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f32_to_i16))
                .collect::<std::result::Result<_, _>>()?,
        };

        Ok(Self::new(samples, spec.sample_rate, spec.channels))
    }

    /// Encode as a 16-bit PCM WAV buffer.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        if self.channels == 0 {
            return Err(GenanimlError::Audio("Clip has zero channels".to_string()));
        }

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in &self.samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Convert a float sample in -1.0..=1.0 to i16.
pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_roundtrip_preserves_samples() {
        let clip = AudioClip::new(vec![0, 1200, -1200, i16::MAX, i16::MIN], 16_000, 1);
        let decoded = AudioClip::from_wav(&clip.to_wav().unwrap()).unwrap();
        assert_eq!(decoded, clip);
    }

    #[test]
    fn test_float_wav_is_rescaled() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(1.0f32).unwrap();
            writer.write_sample(-2.0f32).unwrap();
            writer.finalize().unwrap();
        }

        let clip = AudioClip::from_wav(&cursor.into_inner()).unwrap();
        assert_eq!(clip.samples, vec![i16::MAX, -i16::MAX]);
        assert_eq!(clip.sample_rate, 8_000);
    }

    #[test]
    fn test_invalid_wav_is_an_error() {
        assert!(matches!(
            AudioClip::from_wav(b"not a wav file"),
            Err(GenanimlError::Wav(_))
        ));
    }

    #[test]
    fn test_duration() {
        let clip = AudioClip::new(vec![0; 32_000], 16_000, 2);
        assert!((clip.duration_seconds() - 1.0).abs() < f64::EPSILON);
        assert!(!clip.is_empty());
    }
}
