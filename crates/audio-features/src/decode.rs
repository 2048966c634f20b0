//! Wav Decoding

use crate::FeatureError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// A decoded waveform at its native sample rate.
///
/// Resampling is forbidden in this pipeline: the spectral statistics depend on
/// the recording's original frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
    /// Native sample rate (Hz)
    pub sample_rate: u32,
}

impl Waveform {
    /// Decode a wav stream. Multi-channel input is averaged down to mono.
    pub fn decode<R: Read>(reader: R) -> Result<Self, FeatureError> {
        let mut wav = hound::WavReader::new(reader)
            .map_err(|e| FeatureError::UnreadableAudio(e.to_string()))?;
        let spec = wav.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| FeatureError::UnreadableAudio(e.to_string()))?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                wav.samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| FeatureError::UnreadableAudio(e.to_string()))?
            }
        };

        let channels = spec.channels as usize;
        if channels == 0 || interleaved.is_empty() {
            return Err(FeatureError::UnreadableAudio(
                "empty audio stream".to_string(),
            ));
        }

        let samples: Vec<f32> = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        debug!(
            samples = samples.len(),
            sample_rate = spec.sample_rate,
            channels,
            "decoded waveform"
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    /// Decode a wav file from disk.
    pub fn open(path: &Path) -> Result<Self, FeatureError> {
        let file = File::open(path).map_err(|e| {
            FeatureError::UnreadableAudio(format!("{}: {e}", path.display()))
        })?;
        Self::decode(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_preserves_native_sample_rate() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[0, 16384, -16384, 0]);

        let wave = Waveform::decode(Cursor::new(bytes)).unwrap();
        assert_eq!(wave.sample_rate, 16_000);
        assert_eq!(wave.samples.len(), 4);
        assert!((wave.samples[1] - 0.5).abs() < 1e-4);
        assert!((wave.samples[2] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_decode_averages_channels() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        // interleaved L/R pairs
        let bytes = wav_bytes(spec, &[16384, 0, 0, -16384]);

        let wave = Waveform::decode(Cursor::new(bytes)).unwrap();
        assert_eq!(wave.samples.len(), 2);
        assert!((wave.samples[0] - 0.25).abs() < 1e-4);
        assert!((wave.samples[1] + 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Waveform::decode(Cursor::new(b"definitely not a wav".to_vec()));
        assert!(matches!(err, Err(FeatureError::UnreadableAudio(_))));
    }

    #[test]
    fn test_decode_rejects_empty_stream() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[]);
        let err = Waveform::decode(Cursor::new(bytes));
        assert!(matches!(err, Err(FeatureError::UnreadableAudio(_))));
    }
}
