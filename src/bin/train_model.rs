//! Training utility for the Thyrocast recurrence model.
//!
//! Fits the encoder, scaler and classifier on a labelled CSV and writes the
//! four artifacts (`gb_model.json`, `model_encoder.json`, `model_scaler.json`,
//! `manifest.json`) into the artifact directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin train_model -- --dataset input/Thyroid_Diff.csv --artifact-dir models
//! ```
//!
//! Flags override the `THYROCAST_*` environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use thyrocast::adapters::{CsvDataset, FsArtifactStore};
use thyrocast::application::{TrainingOptions, TrainingService};
use thyrocast::config::{self, AppConfig, LogMode};
use thyrocast::pipeline::UnknownCategoryPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "train_model",
    about = "Train the thyroid recurrence classifier and save its artifacts"
)]
struct Cli {
    /// Labelled CSV with the 16 feature columns and `Recurred`
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Directory the artifacts are written to
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// What to do with categories unseen in training: reject or zero-vector
    #[arg(long)]
    unknown_category: Option<UnknownCategoryPolicy>,

    /// Refuse to write artifacts below this held-out accuracy
    #[arg(long)]
    min_test_accuracy: Option<f64>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(v) = self.dataset {
            config.dataset_path = v;
        }
        if let Some(v) = self.artifact_dir {
            config.artifact_dir = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.test_fraction {
            config.test_fraction = v;
        }
        if let Some(v) = self.unknown_category {
            config.unknown_category = v;
        }
        if let Some(v) = self.min_test_accuracy {
            config.min_test_accuracy = Some(v);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;
    if config.log_mode == LogMode::Auto {
        config.log_mode = LogMode::Stderr;
    }

    let _guard = config::init_logging(&config)
        .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;

    let store = FsArtifactStore::new(&config.artifact_dir)
        .with_context(|| format!("Cannot use artifact directory {:?}", config.artifact_dir))?;
    let service = TrainingService::new(Arc::new(store), TrainingOptions::from(&config));

    let report = service
        .run(&CsvDataset::new(&config.dataset_path))
        .with_context(|| format!("Training on {:?} failed", config.dataset_path))?;

    println!("Training complete.");
    println!("  train rows:       {}", report.train_rows);
    println!(
        "  held-out rows:    {} ({} skipped)",
        report.test_rows, report.skipped_test_rows
    );
    println!("  encoded features: {}", report.encoded_features);
    println!("  labels:           {}", report.labels.join(", "));
    println!("  train accuracy:   {:.4}", report.train_accuracy);
    match report.test_accuracy {
        Some(acc) => println!("  test accuracy:    {acc:.4}"),
        None => println!("  test accuracy:    n/a"),
    }
    if let Some(manifest) = &report.manifest {
        for (name, digest) in &manifest.files {
            println!("  {name}: sha256 {digest}");
        }
    }
    println!("Artifacts written to {}", config.artifact_dir.display());

    Ok(())
}
