//! Gaussian Naive Bayes recurrence classifier.
//!
//! Thin wrapper over `linfa_bayes::GaussianNb` that owns the string labels and
//! the scaled feature schema the model was trained on, so a prediction can
//! never run against columns in a different order.

use std::collections::BTreeSet;

use linfa::prelude::*;
use linfa_bayes::GaussianNb;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, PipelineError};

use super::Frame;

/// Variance smoothing added to every per-class variance.
pub const VAR_SMOOTHING: f64 = 1e-9;

/// Trained classifier plus the label vocabulary it predicts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceClassifier {
    schema: FeatureSchema,
    /// Sorted label vocabulary; the model predicts indices into it
    labels: Vec<String>,
    model: GaussianNb<f64, usize>,
}

impl RecurrenceClassifier {
    /// Train on a scaled frame and one label per row.
    ///
    /// # Errors
    /// Returns `EmptyInput` for no rows, `InvalidParameter` when label and row
    /// counts differ, and `Classifier` if the underlying fit fails.
    pub fn fit(frame: &Frame, labels: &[String]) -> Result<Self, PipelineError> {
        if frame.nrows() == 0 {
            return Err(PipelineError::EmptyInput("no rows to train the classifier on"));
        }
        if labels.len() != frame.nrows() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} labels for {} rows",
                labels.len(),
                frame.nrows()
            )));
        }

        let vocabulary: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let targets: Array1<usize> = labels
            .iter()
            .map(|label| vocabulary.iter().position(|l| l == label).unwrap_or_default())
            .collect();

        let dataset = Dataset::new(frame.data().clone(), targets);
        let model = GaussianNb::params()
            .var_smoothing(VAR_SMOOTHING)
            .fit(&dataset)
            .map_err(|e| PipelineError::Classifier(format!("Naive Bayes training failed: {e}")))?;

        tracing::debug!(
            "Classifier trained on {} rows x {} features, labels {:?}",
            frame.nrows(),
            frame.ncols(),
            vocabulary
        );

        Ok(Self {
            schema: frame.schema().clone(),
            labels: vocabulary,
            model,
        })
    }

    /// Predict one label per row of a scaled frame.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the frame's columns differ from the
    /// training columns.
    pub fn predict(&self, frame: &Frame) -> Result<Vec<String>, PipelineError> {
        self.schema.ensure_same(frame.schema(), "classifier predict")?;
        if frame.nrows() == 0 {
            return Ok(Vec::new());
        }

        let predicted: Array1<usize> = self.model.predict(frame.data());
        predicted
            .iter()
            .map(|&index| {
                self.labels.get(index).cloned().ok_or_else(|| {
                    PipelineError::Classifier(format!("predicted class index {index} has no label"))
                })
            })
            .collect()
    }

    /// Labels the classifier can emit, sorted.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn separable() -> (Frame, Vec<String>) {
        let frame = Frame::new(
            FeatureSchema::new(["x", "y"]),
            array![
                [-2.0, -1.9],
                [-1.8, -2.1],
                [-2.2, -2.0],
                [2.0, 1.9],
                [1.8, 2.1],
                [2.2, 2.0]
            ],
        )
        .expect("valid frame");
        (frame, labels(&["No", "No", "No", "Yes", "Yes", "Yes"]))
    }

    #[test]
    fn test_fit_and_predict_separable_clusters() {
        let (frame, y) = separable();
        let model = RecurrenceClassifier::fit(&frame, &y).expect("Should train");

        assert_eq!(model.labels(), &["No".to_string(), "Yes".to_string()]);
        assert_eq!(model.predict(&frame).expect("predict"), y);

        let probe = Frame::new(frame.schema().clone(), array![[-1.5, -1.5], [1.5, 1.5]])
            .expect("valid frame");
        assert_eq!(model.predict(&probe).expect("predict"), labels(&["No", "Yes"]));
    }

    #[test]
    fn test_predict_empty_frame() {
        let (frame, y) = separable();
        let model = RecurrenceClassifier::fit(&frame, &y).expect("Should train");
        let empty = frame.select_rows(&[]);
        assert!(model.predict(&empty).expect("empty is fine").is_empty());
    }

    #[test]
    fn test_predict_rejects_other_schema() {
        let (frame, y) = separable();
        let model = RecurrenceClassifier::fit(&frame, &y).expect("Should train");
        let other = Frame::new(FeatureSchema::new(["y", "x"]), array![[0.0, 0.0]]).expect("frame");
        assert!(matches!(
            model.predict(&other),
            Err(PipelineError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_label_count_must_match_rows() {
        let (frame, _) = separable();
        assert!(matches!(
            RecurrenceClassifier::fit(&frame, &labels(&["No"])),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_serde_preserves_predictions() {
        let (frame, y) = separable();
        let model = RecurrenceClassifier::fit(&frame, &y).expect("Should train");
        let json = serde_json::to_string(&model).expect("serialize");
        let restored: RecurrenceClassifier = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.predict(&frame).expect("predict"), y);
        assert_eq!(restored.schema(), model.schema());
    }
}
