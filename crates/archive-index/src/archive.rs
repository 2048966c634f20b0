//! Dataset Archive Enumeration

use crate::{IndexError, MachineType};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Audio entries inside the archives carry this suffix
const AUDIO_SUFFIX: &str = ".wav";

/// Parsed archive filename, `{snr}_dB_{machine}.zip`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveName {
    /// Signal-to-noise ratio in dB, may be negative
    pub snr: i32,
    /// Machine type token
    pub machine: MachineType,
}

impl ArchiveName {
    /// Parse the naming convention from an archive path.
    ///
    /// The file stem must split on `_` into exactly `{snr}`, `dB` and a known
    /// machine token, e.g. `-6_dB_slider.zip`.
    pub fn parse(path: &Path) -> Result<Self, IndexError> {
        let malformed = || IndexError::MalformedArchiveName(path.to_path_buf());

        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(malformed)?;
        let tokens: Vec<&str> = stem.split('_').collect();
        let &[snr, db, machine] = tokens.as_slice() else {
            return Err(malformed());
        };
        if db != "dB" {
            return Err(malformed());
        }
        let snr: i32 = snr.parse().map_err(|_| malformed())?;
        let machine: MachineType = machine.parse().map_err(|_| malformed())?;

        Ok(Self { snr, machine })
    }
}

/// One row of the index table: a single audio entry with derived labels.
///
/// `wavefile` is the entry's path inside its archive; zip central directories
/// keep entry names unique, so it identifies the entry within one archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Name of the source archive file
    pub dataset: String,
    /// Machine type from the archive filename
    pub machine: MachineType,
    /// Signal-to-noise ratio from the archive filename (dB)
    pub snr: i32,
    /// Numeric machine id from the `id_{n}` directory
    pub machine_id: u32,
    /// 1 if recorded under normal operation, 0 if abnormal
    pub is_normal: u8,
    /// Entry path inside the archive
    pub wavefile: String,
}

/// Derive `(machine_id, is_normal)` from an entry path.
///
/// Convention: `.../id_{machine_id}/{normal|abnormal}/{file}.wav`. The label
/// check is a suffix match, so `mix_abnormal` also counts as abnormal.
fn parse_entry_path(name: &str) -> Result<(u32, u8), IndexError> {
    let malformed = || IndexError::MalformedEntryPath(name.to_string());

    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() < 3 {
        return Err(malformed());
    }
    let condition_dir = parts[parts.len() - 2];
    let id_dir = parts[parts.len() - 3];

    let is_normal = u8::from(!condition_dir.ends_with("abnormal"));
    let machine_id: u32 = id_dir
        .rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(malformed)?;

    Ok((machine_id, is_normal))
}

/// Enumerate every audio entry of a dataset archive into index rows.
///
/// Read-only scan of the archive directory structure; no audio is decoded.
/// Rows come back in archive-listing order, which is stable for a given file.
pub fn index_archive(path: &Path) -> Result<Vec<ArchiveEntry>, IndexError> {
    let name = ArchiveName::parse(path)?;
    let dataset = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IndexError::MalformedArchiveName(path.to_path_buf()))?
        .to_string();

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let entry_name = entry.name().to_string();
        if !entry_name.ends_with(AUDIO_SUFFIX) {
            continue;
        }
        let (machine_id, is_normal) = parse_entry_path(&entry_name)?;
        entries.push(ArchiveEntry {
            dataset: dataset.clone(),
            machine: name.machine,
            snr: name.snr,
            machine_id,
            is_normal,
            wavefile: entry_name,
        });
    }

    debug!(dataset = %dataset, rows = entries.len(), "indexed archive");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_archive_name_parse() {
        let name = ArchiveName::parse(Path::new("data/-6_dB_slider.zip")).unwrap();
        assert_eq!(name.snr, -6);
        assert_eq!(name.machine, MachineType::Slider);
    }

    #[test]
    fn test_archive_name_rejects_bad_shapes() {
        for bad in [
            "slider.zip",
            "6_db_slider.zip",
            "6_dB_turbine.zip",
            "x_dB_fan.zip",
            "6_dB_fan_extra.zip",
        ] {
            assert!(matches!(
                ArchiveName::parse(Path::new(bad)),
                Err(IndexError::MalformedArchiveName(_))
            ));
        }
    }

    #[test]
    fn test_entry_path_labels() {
        assert_eq!(parse_entry_path("fan/id_01/normal/0001.wav").unwrap(), (1, 1));
        assert_eq!(parse_entry_path("fan/id_04/abnormal/0001.wav").unwrap(), (4, 0));
        // suffix match: prefixed condition directories still count as abnormal
        assert_eq!(parse_entry_path("fan/id_02/mix_abnormal/0001.wav").unwrap(), (2, 0));
    }

    #[test]
    fn test_entry_path_rejects_short_or_unparsable() {
        assert!(parse_entry_path("0001.wav").is_err());
        assert!(parse_entry_path("normal/0001.wav").is_err());
        assert!(parse_entry_path("id_xx/normal/0001.wav").is_err());
    }

    #[test]
    fn test_index_single_entry_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("6_dB_fan.zip");

        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer
            .start_file("id_01/normal/0001.wav", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"not real audio").unwrap();
        writer
            .start_file("id_01/normal/readme.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"skipped, not .wav").unwrap();
        writer.finish().unwrap();

        let rows = index_archive(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            ArchiveEntry {
                dataset: "6_dB_fan.zip".to_string(),
                machine: MachineType::Fan,
                snr: 6,
                machine_id: 1,
                is_normal: 1,
                wavefile: "id_01/normal/0001.wav".to_string(),
            }
        );
    }

    proptest! {
        #[test]
        fn prop_archive_name_round_trip(snr in -99i32..=99, machine_idx in 0usize..4) {
            let machine = MachineType::ALL[machine_idx];
            let filename = format!("{snr}_dB_{machine}.zip");
            let parsed = ArchiveName::parse(Path::new(&filename)).unwrap();
            prop_assert_eq!(parsed.snr, snr);
            prop_assert_eq!(parsed.machine, machine);
        }

        #[test]
        fn prop_is_normal_is_a_suffix_check(prefix in "[a-z]{0,8}", id in 0u32..100) {
            let abnormal = format!("id_{id:02}/{prefix}abnormal/0001.wav");
            let (parsed_id, is_normal) = parse_entry_path(&abnormal).unwrap();
            prop_assert_eq!(parsed_id, id);
            prop_assert_eq!(is_normal, 0);
        }
    }
}
