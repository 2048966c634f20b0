//! Audio Feature Extraction
//!
//! Decodes machine-sound recordings at their native sample rate and reduces
//! each one to a fixed schema of scalar summary statistics (temporal and
//! spectral), suitable for tabular storage and ML inference.

mod decode;
mod features;
mod mel;
mod statistics;
mod stft;

pub use decode::Waveform;
pub use features::{ExtractorConfig, FeatureExtractor, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use statistics::Summary;
pub use stft::{Spectrogram, StftProcessor};

use thiserror::Error;

/// Errors during audio decoding and feature extraction
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Audio bytes could not be decoded into a waveform
    #[error("Unreadable audio: {0}")]
    UnreadableAudio(String),
}
