//! Feature Assembly over Index Tables

use crate::{BuildError, Progress};
use archive_index::ArchiveEntry;
use audio_features::{FeatureExtractor, FeatureVector, Waveform};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};
use zip::ZipArchive;

/// One persisted row: index metadata joined with its feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub entry: ArchiveEntry,
    pub features: FeatureVector,
}

/// Extract features for every index row and join them back by position.
///
/// Rows are grouped by their `dataset` field; each archive is opened exactly
/// once and its handle dropped before the next group starts. Output rows come
/// back in input order and the output length always equals the input length:
/// the first unreadable entry aborts the whole batch instead of dropping rows
/// silently.
pub fn assemble(
    entries: &[ArchiveEntry],
    data_dir: &Path,
    extractor: &FeatureExtractor,
    progress: &dyn Progress,
) -> Result<Vec<TrainingRow>, BuildError> {
    // group row positions by dataset, first-seen order
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match groups.iter_mut().find(|(name, _)| *name == entry.dataset) {
            Some((_, positions)) => positions.push(i),
            None => groups.push((entry.dataset.clone(), vec![i])),
        }
    }

    progress.begin(entries.len());
    let mut assembled: Vec<(usize, TrainingRow)> = Vec::with_capacity(entries.len());

    for (dataset, positions) in &groups {
        let path = data_dir.join(dataset);
        info!(dataset = %dataset, rows = positions.len(), "extracting features");

        // one open archive handle per group, released on every exit path
        let mut archive = ZipArchive::new(File::open(&path)?)?;
        for &i in positions {
            let reader = archive.by_name(&entries[i].wavefile)?;
            let wave = Waveform::decode(reader)?;
            assembled.push((
                i,
                TrainingRow {
                    entry: entries[i].clone(),
                    features: extractor.extract(&wave),
                },
            ));
            progress.advance();
        }
        debug!(dataset = %dataset, "archive done");
    }
    progress.finish();

    // groups partition the input positions, so this restores input order
    assembled.sort_by_key(|(i, _)| *i);
    Ok(assembled.into_iter().map(|(_, row)| row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullProgress;
    use archive_index::index_archive;
    use std::io::{Cursor, Write};
    use std::path::PathBuf;
    use zip::write::SimpleFileOptions;

    fn sine_wav_bytes(freq: f64, sr: u32, samples: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: sr,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..samples {
            let v = (2.0 * std::f64::consts::PI * freq * i as f64 / sr as f64).sin();
            writer.write_sample((v * i16::MAX as f64 * 0.5) as i16).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    fn write_fixture_archive(dir: &Path, name: &str, entries: &[(&str, Vec<u8>)]) -> PathBuf {
        let path = dir.join(name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for (entry_name, bytes) in entries {
            writer
                .start_file(*entry_name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_assemble_preserves_row_count_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_fixture_archive(
            dir.path(),
            "0_dB_pump.zip",
            &[
                ("id_00/normal/0000.wav", sine_wav_bytes(440.0, 16_000, 4_096)),
                ("id_00/abnormal/0001.wav", sine_wav_bytes(880.0, 16_000, 4_096)),
                ("id_02/normal/0002.wav", sine_wav_bytes(220.0, 16_000, 4_096)),
            ],
        );

        let entries = index_archive(&archive).unwrap();
        assert_eq!(entries.len(), 3);

        let extractor = FeatureExtractor::default();
        let rows = assemble(&entries, dir.path(), &extractor, &NullProgress).unwrap();

        assert_eq!(rows.len(), entries.len());
        for (row, entry) in rows.iter().zip(&entries) {
            assert_eq!(&row.entry, entry);
        }
        assert_eq!(rows[1].entry.is_normal, 0);
        assert_eq!(rows[2].entry.machine_id, 2);
    }

    #[test]
    fn test_assemble_spans_multiple_archives() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture_archive(
            dir.path(),
            "0_dB_fan.zip",
            &[("id_00/normal/0000.wav", sine_wav_bytes(440.0, 16_000, 4_096))],
        );
        let b = write_fixture_archive(
            dir.path(),
            "-6_dB_fan.zip",
            &[("id_00/normal/0000.wav", sine_wav_bytes(440.0, 16_000, 4_096))],
        );

        let mut entries = index_archive(&a).unwrap();
        entries.extend(index_archive(&b).unwrap());

        let extractor = FeatureExtractor::default();
        let rows = assemble(&entries, dir.path(), &extractor, &NullProgress).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry.snr, 0);
        assert_eq!(rows[1].entry.snr, -6);
    }

    #[test]
    fn test_unreadable_entry_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_fixture_archive(
            dir.path(),
            "6_dB_valve.zip",
            &[
                ("id_00/normal/0000.wav", sine_wav_bytes(440.0, 16_000, 4_096)),
                ("id_00/normal/0001.wav", b"not a wav at all".to_vec()),
            ],
        );

        let entries = index_archive(&archive).unwrap();
        let extractor = FeatureExtractor::default();
        let result = assemble(&entries, dir.path(), &extractor, &NullProgress);
        assert!(matches!(result, Err(BuildError::Feature(_))));
    }
}
