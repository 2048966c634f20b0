//! Archive Indexer
//!
//! Scans MIMII dataset zip archives and derives per-entry labels from the
//! archive filename and the entry path, without decoding any audio.

mod archive;
mod machine;

pub use archive::{index_archive, ArchiveEntry, ArchiveName};
pub use machine::MachineType;

use std::path::PathBuf;
use thiserror::Error;

/// Errors while indexing a dataset archive
#[derive(Debug, Error)]
pub enum IndexError {
    /// Archive filename does not follow the `{snr}_dB_{machine}.zip` convention
    #[error("Malformed archive name: {0:?} (expected \"{{snr}}_dB_{{machine}}.zip\")")]
    MalformedArchiveName(PathBuf),

    /// Audio entry path does not follow the `id_{n}/{normal|abnormal}/{file}.wav` convention
    #[error("Malformed entry path in archive: {0:?}")]
    MalformedEntryPath(String),

    /// Archive could not be opened or read
    #[error("Archive read error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
