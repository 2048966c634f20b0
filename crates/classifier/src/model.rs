//! Persisted Model Artifacts

use crate::ClassifierError;
use archive_index::MachineType;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// A trained, externally-produced model artifact.
///
/// One file per machine type, `Predict_{machine}_sound_type.sav`. The file is
/// read-only for this pipeline; it only exposes a `predict(matrix) -> labels`
/// capability. The artifact does not reliably reject matrices with a wrong
/// column set, so callers must project features per [`crate::selected_features`].
pub struct PersistedModel {
    path: PathBuf,
}

impl PersistedModel {
    /// Resolve the artifact path for a machine type: the override if given,
    /// else the convention-based default under `model_dir`.
    pub fn resolve(
        machine: MachineType,
        model_dir: &Path,
        model_override: Option<&Path>,
    ) -> Result<Self, ClassifierError> {
        let path = match model_override {
            Some(path) => path.to_path_buf(),
            None => model_dir.join(format!("Predict_{machine}_sound_type.sav")),
        };
        if !path.exists() {
            return Err(ClassifierError::ModelNotFound(path));
        }
        debug!(path = %path.display(), "resolved model artifact");
        Ok(Self { path })
    }

    /// Artifact location on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the model over an `n × k` feature matrix, one label per row.
    ///
    /// Output label 1 means normal operation, anything else abnormal.
    pub fn predict(&self, matrix: &[Vec<f64>]) -> Result<Vec<i64>, ClassifierError> {
        let inference = |e: TractError| ClassifierError::Inference(e.to_string());

        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(ClassifierError::EmptyInput);
        }

        let model = tract_onnx::onnx()
            .model_for_path(&self.path)
            .map_err(inference)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(rows, cols)),
            )
            .map_err(inference)?
            .into_optimized()
            .map_err(inference)?
            .into_runnable()
            .map_err(inference)?;

        let flat: Vec<f32> = matrix.iter().flatten().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[rows, cols], &flat).map_err(inference)?;

        let outputs = model.run(tvec!(input.into())).map_err(inference)?;
        let labels = outputs[0].cast_to::<i64>().map_err(inference)?;
        let labels = labels.as_slice::<i64>().map_err(inference)?.to_vec();

        info!(rows, cols, "model prediction complete");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_follows_naming_convention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Predict_valve_sound_type.sav");
        std::fs::write(&path, b"opaque model bytes").unwrap();

        let model = PersistedModel::resolve(MachineType::Valve, dir.path(), None).unwrap();
        assert_eq!(model.path(), path);
    }

    #[test]
    fn test_resolve_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = PersistedModel::resolve(MachineType::Pump, dir.path(), None);
        assert!(matches!(err, Err(ClassifierError::ModelNotFound(_))));
    }

    #[test]
    fn test_resolve_prefers_override() {
        let dir = tempfile::tempdir().unwrap();
        let override_path = dir.path().join("custom.onnx");
        std::fs::write(&override_path, b"opaque").unwrap();

        let model =
            PersistedModel::resolve(MachineType::Fan, dir.path(), Some(&override_path)).unwrap();
        assert_eq!(model.path(), override_path);
    }
}
