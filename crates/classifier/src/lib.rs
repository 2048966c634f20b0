//! Machine-Sound Classifier
//!
//! Resolves a machine-type-specific trained model artifact, projects extracted
//! feature vectors onto the column subset that model was trained on, and
//! returns a normal/abnormal verdict per input recording.

mod columns;
mod model;
mod predict;

pub use columns::selected_features;
pub use model::PersistedModel;
pub use predict::{predict_failure, predict_failure_single, Condition, PredictorConfig};

use audio_features::FeatureError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during prediction
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Machine type token outside the supported vocabulary
    #[error("machine_type should be slider, fan, pump, or valve (got {0:?})")]
    UnsupportedMachineType(String),

    /// Resolved model artifact path does not exist
    #[error("Trained model file not found: {0}")]
    ModelNotFound(PathBuf),

    /// Prediction was called without any sound input
    #[error("No sound inputs provided")]
    EmptyInput,

    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Model could not be loaded or executed
    #[error("Model inference error: {0}")]
    Inference(String),
}
