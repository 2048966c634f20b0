//! End-to-End Table Build

use crate::{assemble, write_table, BuildError, Progress};
use archive_index::{index_archive, ArchiveEntry, MachineType};
use audio_features::FeatureExtractor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// SNR variants recorded for every machine type, in table order
const SNR_VARIANTS_DB: [i32; 3] = [0, -6, 6];

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory receiving `{machine}_all.csv.xz`, created if absent
    pub output_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("processed_data"),
        }
    }
}

/// Build the full training table for one machine type.
///
/// Indexes the three conventional archives (`0_dB`, `-6_dB`, `6_dB`) from
/// `data_folder`, concatenates their index rows in that order, extracts
/// features for every entry and writes `{output_dir}/{machine}_all.csv.xz`.
/// Returns the path of the written table.
pub fn build_training_table(
    machine: MachineType,
    data_folder: &Path,
    config: &BuildConfig,
    progress: &dyn Progress,
) -> Result<PathBuf, BuildError> {
    let mut entries: Vec<ArchiveEntry> = Vec::new();
    for snr in SNR_VARIANTS_DB {
        let archive = data_folder.join(format!("{snr}_dB_{machine}.zip"));
        entries.extend(index_archive(&archive)?);
    }
    info!(machine = %machine, rows = entries.len(), "indexed archives");

    let extractor = FeatureExtractor::default();
    let rows = assemble(&entries, data_folder, &extractor, progress)?;

    fs::create_dir_all(&config.output_dir)?;
    let out_path = config.output_dir.join(format!("{machine}_all.csv.xz"));
    write_table(&rows, &out_path)?;

    Ok(out_path)
}
