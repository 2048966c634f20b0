//! Compressed CSV Output

use crate::{BuildError, TrainingRow};
use audio_features::FEATURE_NAMES;
use std::fs::File;
use std::path::Path;
use tracing::info;
use xz2::write::XzEncoder;

const XZ_COMPRESSION_LEVEL: u32 = 6;

/// Index columns, in persisted order, ahead of the feature columns.
///
/// `SNR` keeps the casing of the historical tables.
const INDEX_COLUMNS: [&str; 6] = [
    "dataset",
    "machine",
    "SNR",
    "machine_id",
    "wavefile",
    "is_normal",
];

/// Persist training rows as an xz-compressed CSV table.
///
/// Header = index columns followed by the feature names in extraction order;
/// no row-number column is written.
pub fn write_table(rows: &[TrainingRow], path: &Path) -> Result<(), BuildError> {
    let encoder = XzEncoder::new(File::create(path)?, XZ_COMPRESSION_LEVEL);
    let mut writer = csv::Writer::from_writer(encoder);

    let header = INDEX_COLUMNS.iter().chain(FEATURE_NAMES.iter());
    writer.write_record(header)?;

    for row in rows {
        let mut record: Vec<String> = vec![
            row.entry.dataset.clone(),
            row.entry.machine.to_string(),
            row.entry.snr.to_string(),
            row.entry.machine_id.to_string(),
            row.entry.wavefile.clone(),
            row.entry.is_normal.to_string(),
        ];
        record.extend(row.features.values().iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let encoder = writer.into_inner().map_err(|e| BuildError::Io(e.into_error()))?;
    encoder.finish()?;

    info!(rows = rows.len(), path = %path.display(), "wrote training table");
    Ok(())
}
