//! Training service: fits the pipeline and persists its artifacts.
//!
//! Fit order is strict: encoder on the training rows, then the scaler on the
//! encoded training frame, then the classifier on the scaled frame. The
//! held-out rows only ever pass through already-fitted stages.

use std::sync::Arc;

use crate::adapters::StoreError;
use crate::config::AppConfig;
use crate::domain::FeatureRow;
use crate::pipeline::{
    train_test_split, Frame, OneHotEncoder, RecurrenceClassifier, RobustScaler,
    UnknownCategoryPolicy,
};
use crate::ports::{ArtifactStore, DatasetSource, LabeledDataset};
use crate::ThyrocastError;

use super::artifacts::{ArtifactManifest, ModelBundle, RunParameters};

/// Knobs for one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub seed: u64,
    pub test_fraction: f64,
    pub unknown_category: UnknownCategoryPolicy,
    /// Fail the run, before writing anything, below this held-out accuracy
    pub min_test_accuracy: Option<f64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            test_fraction: 0.3,
            unknown_category: UnknownCategoryPolicy::Reject,
            min_test_accuracy: None,
        }
    }
}

impl From<&AppConfig> for TrainingOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            seed: config.seed,
            test_fraction: config.test_fraction,
            unknown_category: config.unknown_category,
            min_test_accuracy: config.min_test_accuracy,
        }
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Held-out rows dropped for a category outside the fitted vocabulary
    pub skipped_test_rows: usize,
    pub encoded_features: usize,
    pub labels: Vec<String>,
    pub train_accuracy: f64,
    /// `None` when every held-out row was skipped
    pub test_accuracy: Option<f64>,
    /// Set once artifacts have been written
    pub manifest: Option<ArtifactManifest>,
}

/// Service that trains the recurrence pipeline.
pub struct TrainingService<S>
where
    S: ArtifactStore,
{
    store: Arc<S>,
    options: TrainingOptions,
}

impl<S> TrainingService<S>
where
    S: ArtifactStore,
    S::Error: Into<StoreError>,
{
    /// Create a new training service.
    pub fn new(store: Arc<S>, options: TrainingOptions) -> Self {
        Self { store, options }
    }

    #[must_use]
    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Fit all stages on a dataset without touching the store.
    ///
    /// # Errors
    /// Returns error if the dataset is malformed or any stage fails to fit.
    pub fn fit(&self, dataset: LabeledDataset) -> Result<(ModelBundle, TrainingReport), ThyrocastError> {
        if dataset.rows.len() != dataset.labels.len() {
            return Err(ThyrocastError::Validation(format!(
                "{} rows but {} labels",
                dataset.rows.len(),
                dataset.labels.len()
            )));
        }

        let (train, test) = train_test_split(
            dataset.into_samples(),
            self.options.test_fraction,
            self.options.seed,
        )?;
        let (train_rows, train_labels): (Vec<FeatureRow>, Vec<String>) = train.into_iter().unzip();

        tracing::info!(
            "Training on {} rows, holding out {} (seed {})",
            train_rows.len(),
            test.len(),
            self.options.seed
        );

        // (1) encoder, (2) encode train, (3) scaler, (4) scale train
        let encoder = OneHotEncoder::fit(&train_rows, self.options.unknown_category)?;
        let encoded_train = encoder.transform(&train_rows)?;
        let scaler = RobustScaler::fit(&encoded_train)?;
        let scaled_train = scaler.transform(&encoded_train)?;

        // (5) classifier
        let classifier = RecurrenceClassifier::fit(&scaled_train, &train_labels)?;
        let train_accuracy = accuracy(&classifier.predict(&scaled_train)?, &train_labels);

        // Held-out rows replay through the fitted stages only
        let test_rows = test.len();
        let (test_rows_kept, test_labels): (Vec<FeatureRow>, Vec<String>) = test
            .into_iter()
            .filter(|(row, _)| {
                self.options.unknown_category == UnknownCategoryPolicy::ZeroVector
                    || encoder.unknown_categories(row).is_empty()
            })
            .unzip();
        let skipped_test_rows = test_rows - test_rows_kept.len();
        if skipped_test_rows > 0 {
            tracing::warn!(
                "Skipped {} held-out rows with categories outside the fitted vocabulary",
                skipped_test_rows
            );
        }

        let test_accuracy = if test_rows_kept.is_empty() {
            None
        } else {
            let scaled_test: Frame = scaler.transform(&encoder.transform(&test_rows_kept)?)?;
            Some(accuracy(&classifier.predict(&scaled_test)?, &test_labels))
        };

        match test_accuracy {
            Some(acc) => tracing::info!(
                "Accuracy: train {:.3}, held-out {:.3} ({} rows)",
                train_accuracy,
                acc,
                test_rows_kept.len()
            ),
            None => tracing::warn!("Accuracy: train {:.3}, no held-out rows scored", train_accuracy),
        }

        let report = TrainingReport {
            train_rows: train_rows.len(),
            test_rows,
            skipped_test_rows,
            encoded_features: encoder.output_schema().len(),
            labels: classifier.labels().to_vec(),
            train_accuracy,
            test_accuracy,
            manifest: None,
        };
        let bundle = ModelBundle {
            encoder,
            scaler,
            classifier,
        };
        Ok((bundle, report))
    }

    /// Load a dataset, fit, check the accuracy floor and persist artifacts.
    ///
    /// Nothing is written unless every stage fitted and the floor was met.
    ///
    /// # Errors
    /// Returns error if loading, fitting, the accuracy floor or any write fails.
    pub fn run<D: DatasetSource>(&self, source: &D) -> Result<TrainingReport, ThyrocastError> {
        tracing::info!("Loading training data from {}", source.describe());
        let dataset = source.load()?;

        let (bundle, mut report) = self.fit(dataset)?;

        if let Some(required) = self.options.min_test_accuracy {
            let actual = report.test_accuracy.unwrap_or(0.0);
            if actual < required {
                tracing::error!(
                    "Held-out accuracy {:.3} below required {:.3}, artifacts not written",
                    actual,
                    required
                );
                return Err(ThyrocastError::AccuracyBelowThreshold { actual, required });
            }
        }

        let manifest = bundle.save(
            self.store.as_ref(),
            RunParameters {
                seed: self.options.seed,
                test_fraction: self.options.test_fraction,
            },
        )?;
        report.manifest = Some(manifest);
        Ok(report)
    }
}

/// Fraction of predictions equal to the truth.
fn accuracy(predicted: &[String], truth: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    correct as f64 / truth.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryArtifactStore;
    use crate::application::artifacts::{
        ENCODER_ARTIFACT, MANIFEST_ARTIFACT, MODEL_ARTIFACT, SCALER_ARTIFACT,
    };
    use crate::testing::cohort;

    fn service(options: TrainingOptions) -> (Arc<MemoryArtifactStore>, TrainingService<MemoryArtifactStore>) {
        let store = Arc::new(MemoryArtifactStore::new());
        (Arc::clone(&store), TrainingService::new(store, options))
    }

    #[test]
    fn test_run_writes_all_artifacts() {
        let (store, service) = service(TrainingOptions::default());
        let report = service.run(&cohort(300, 1)).expect("Should train");

        assert_eq!(report.train_rows, 210);
        assert_eq!(report.test_rows, 90);
        assert_eq!(report.labels, vec!["No", "Yes"]);
        assert!(report.train_accuracy > 0.95);
        assert!(report.test_accuracy.expect("held-out rows scored") > 0.9);

        let manifest = report.manifest.expect("manifest written");
        assert_eq!(manifest.seed, 0);
        assert_eq!(manifest.encoded_columns.len(), report.encoded_features);
        // Sorted by name
        assert_eq!(
            store.names().expect("names"),
            vec![MODEL_ARTIFACT, MANIFEST_ARTIFACT, ENCODER_ARTIFACT, SCALER_ARTIFACT]
        );
    }

    #[test]
    fn test_accuracy_floor_blocks_writes() {
        let (store, service) = service(TrainingOptions {
            min_test_accuracy: Some(1.01),
            ..TrainingOptions::default()
        });
        let err = service.run(&cohort(300, 1)).expect_err("floor unreachable");
        assert!(matches!(err, ThyrocastError::AccuracyBelowThreshold { .. }));
        assert!(store.names().expect("names").is_empty());
    }

    #[test]
    fn test_mismatched_labels_rejected() {
        let (_, service) = service(TrainingOptions::default());
        let mut dataset = cohort(30, 1);
        dataset.labels.pop();
        assert!(matches!(
            service.fit(dataset),
            Err(ThyrocastError::Validation(_))
        ));
    }

    #[test]
    fn test_accuracy_helper() {
        let p = vec!["Yes".to_string(), "No".to_string()];
        let t = vec!["Yes".to_string(), "Yes".to_string()];
        assert!((accuracy(&p, &t) - 0.5).abs() < f64::EPSILON);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
