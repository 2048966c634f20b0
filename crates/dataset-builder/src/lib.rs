//! Dataset Builder
//!
//! Assembles training tables: indexes dataset archives, extracts a feature
//! vector per audio entry and persists the joined rows as compressed CSV.

mod assemble;
mod pipeline;
mod writer;

pub use assemble::{assemble, TrainingRow};
pub use pipeline::{build_training_table, BuildConfig};
pub use writer::write_table;

use archive_index::IndexError;
use audio_features::FeatureError;
use thiserror::Error;

/// Errors while building a training table
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("Archive read error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Explicit progress hook for long extraction runs.
///
/// Replaces ambient progress-bar state; the CLI wires a terminal bar in,
/// library callers default to [`NullProgress`].
pub trait Progress {
    fn begin(&self, _total: usize) {}
    fn advance(&self) {}
    fn finish(&self) {}
}

/// Progress hook that does nothing
pub struct NullProgress;

impl Progress for NullProgress {}
