//! Machine-Sound Screening CLI

use anyhow::anyhow;
use archive_index::MachineType;
use clap::{Parser, Subcommand};
use classifier::{predict_failure, PredictorConfig};
use dataset_builder::{build_training_table, BuildConfig, Progress};
use indicatif::{ProgressBar, ProgressDrawTarget};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mimii", version, about = "Machine-sound anomaly screening pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the training table for one machine type from a folder of archives
    BuildDataset {
        /// Machine type: fan, pump, slider or valve
        machine: String,
        /// Folder holding the {snr}_dB_{machine}.zip archives
        data_folder: PathBuf,
        /// Output directory for the compressed table
        #[arg(long, default_value = "processed_data")]
        out_dir: PathBuf,
    },
    /// Classify sound files as NORMAL or ABNORMAL operation
    Predict {
        /// Machine type: fan, pump, slider or valve
        machine: String,
        /// Sound files to classify
        #[arg(required = true)]
        sounds: Vec<PathBuf>,
        /// Model artifact path overriding the saved_model convention
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

/// Terminal progress bar behind the pipeline's progress hook
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Progress for TerminalProgress {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initialize logging
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::BuildDataset { machine, data_folder, out_dir } => {
            let machine: MachineType = machine.parse().map_err(|_| {
                anyhow!("unsupported machine type {machine:?}; expected fan, pump, slider or valve")
            })?;
            let config = BuildConfig { output_dir: out_dir };

            info!(%machine, data_folder = %data_folder.display(), "building training table");
            let path =
                build_training_table(machine, &data_folder, &config, &TerminalProgress::new())?;
            println!("Saved to {}", path.display());
        }
        Command::Predict { machine, sounds, model } => {
            let verdicts =
                predict_failure(&sounds, &machine, &PredictorConfig::default(), model.as_deref())?;

            if let [verdict] = verdicts.as_slice() {
                println!("{verdict}");
            } else {
                for (sound, verdict) in sounds.iter().zip(&verdicts) {
                    println!("{}: {verdict}", sound.display());
                }
            }
        }
    }

    Ok(())
}
