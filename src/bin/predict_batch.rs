//! Batch prediction over a CSV of patient records.
//!
//! Reads the 16 feature columns (a `Recurred` column, if present, is ignored),
//! replays the stored pipeline and prints one label per row. With `--output`
//! the input rows are written back with a `Predicted` column appended.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin predict_batch -- --input patients.csv --artifact-dir models
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use thyrocast::adapters::{CsvDataset, FsArtifactStore};
use thyrocast::config::{self, AppConfig, LogMode};
use thyrocast::domain::FeatureRow;
use thyrocast::InferenceContext;

const PREDICTED_COLUMN: &str = "Predicted";

#[derive(Parser, Debug)]
#[command(
    name = "predict_batch",
    about = "Predict thyroid cancer recurrence for every row of a CSV"
)]
struct Cli {
    /// CSV with the 16 feature columns
    #[arg(long)]
    input: PathBuf,

    /// Write input rows plus predictions here instead of printing labels
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory holding the trained artifacts
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.artifact_dir {
        config.artifact_dir = dir;
    }
    if config.log_mode == LogMode::Auto {
        config.log_mode = LogMode::Stderr;
    }
    let _guard = config::init_logging(&config)
        .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;

    let context = InferenceContext::load(&FsArtifactStore::open(&config.artifact_dir))
        .with_context(|| format!("Failed to load model artifacts from {:?}", config.artifact_dir))?;

    let rows = CsvDataset::new(&cli.input)
        .load_features()
        .with_context(|| format!("Failed to read {:?}", cli.input))?;
    let labels = context.predict(&rows)?;
    tracing::info!("Predicted {} rows from {}", labels.len(), cli.input.display());

    match cli.output {
        Some(path) => {
            write_predictions(&path, &rows, &labels)
                .with_context(|| format!("Failed to write {path:?}"))?;
            println!("Wrote {} predictions to {}", labels.len(), path.display());
        }
        None => {
            for label in &labels {
                println!("{label}");
            }
        }
    }

    Ok(())
}

fn write_predictions(path: &Path, rows: &[FeatureRow], labels: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    if let Some(first) = rows.first() {
        let mut header: Vec<&str> = first.columns().collect();
        header.push(PREDICTED_COLUMN);
        writer.write_record(&header)?;
    }

    for (row, label) in rows.iter().zip(labels) {
        let mut record: Vec<String> = row.values().map(ToString::to_string).collect();
        record.push(label.clone());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
