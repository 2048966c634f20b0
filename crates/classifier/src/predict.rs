//! Failure Prediction

use crate::{selected_features, ClassifierError, PersistedModel};
use archive_index::MachineType;
use audio_features::{FeatureExtractor, Waveform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Operating condition verdict for one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Abnormal,
    Normal,
}

impl Condition {
    /// Numeric label: 0 = abnormal, 1 = normal
    pub fn label(&self) -> u8 {
        match self {
            Condition::Abnormal => 0,
            Condition::Normal => 1,
        }
    }

    fn from_label(label: i64) -> Self {
        if label == 1 {
            Condition::Normal
        } else {
            Condition::Abnormal
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Abnormal => "ABNORMAL",
            Condition::Normal => "NORMAL",
        })
    }
}

/// Predictor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Directory holding the `Predict_{machine}_sound_type.sav` artifacts
    pub model_dir: PathBuf,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./saved_model"),
        }
    }
}

/// Predict whether each given sound file records normal operation.
///
/// The machine type token is validated before any file is touched; the model
/// artifact is resolved and checked next; only then is audio decoded. Feature
/// vectors are projected onto the machine type's column list and fed to the
/// model as one matrix, preserving input order in the returned verdicts.
/// A decode failure on any input aborts the whole call.
pub fn predict_failure<P: AsRef<Path>>(
    sounds: &[P],
    machine_type: &str,
    config: &PredictorConfig,
    model_override: Option<&Path>,
) -> Result<Vec<Condition>, ClassifierError> {
    let machine: MachineType = machine_type
        .parse()
        .map_err(|_| ClassifierError::UnsupportedMachineType(machine_type.to_string()))?;
    if sounds.is_empty() {
        return Err(ClassifierError::EmptyInput);
    }

    let model = PersistedModel::resolve(machine, &config.model_dir, model_override)?;
    let columns = selected_features(machine);

    let extractor = FeatureExtractor::default();
    let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(sounds.len());
    for sound in sounds {
        let wave = Waveform::open(sound.as_ref())?;
        let features = extractor.extract(&wave);
        let row = columns
            .iter()
            .map(|&name| {
                features.value(name).ok_or_else(|| {
                    ClassifierError::Inference(format!("feature {name} missing from schema"))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        matrix.push(row);
    }
    debug!(machine = %machine, inputs = matrix.len(), columns = columns.len(), "matrix built");

    let labels = model.predict(&matrix)?;
    Ok(labels.into_iter().map(Condition::from_label).collect())
}

/// Convenience wrapper for the single-recording case
pub fn predict_failure_single(
    sound: &Path,
    machine_type: &str,
    config: &PredictorConfig,
    model_override: Option<&Path>,
) -> Result<Condition, ClassifierError> {
    let verdicts = predict_failure(&[sound], machine_type, config, model_override)?;
    verdicts
        .into_iter()
        .next()
        .ok_or_else(|| ClassifierError::Inference("model returned no labels".to_string()))
}
