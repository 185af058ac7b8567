//! Inference context: replays the fitted pipeline on new rows.
//!
//! Built once from stored artifacts and then shared by reference. It is
//! immutable after construction, so callers on any thread can predict
//! without locking.

use crate::adapters::StoreError;
use crate::domain::{FeatureRow, FeatureSchema, PatientFeatures, Prediction};
use crate::pipeline::{Frame, UnknownCategoryPolicy};
use crate::ports::ArtifactStore;
use crate::ThyrocastError;

use super::artifacts::{ArtifactManifest, ModelBundle};

/// Loaded, verified pipeline ready to predict.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    bundle: ModelBundle,
    manifest: Option<ArtifactManifest>,
}

impl InferenceContext {
    /// Wrap an in-memory bundle, checking that its stages couple.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the stages disagree on the encoded schema.
    pub fn from_bundle(bundle: ModelBundle) -> Result<Self, ThyrocastError> {
        bundle.check_coupling()?;
        Ok(Self {
            bundle,
            manifest: None,
        })
    }

    /// Load and verify all artifacts from a store.
    ///
    /// # Errors
    /// Returns error if an artifact is missing, fails its integrity check or
    /// the stages do not couple.
    pub fn load<S>(store: &S) -> Result<Self, ThyrocastError>
    where
        S: ArtifactStore,
        S::Error: Into<StoreError>,
    {
        let (bundle, manifest) = ModelBundle::load(store)?;
        Ok(Self { bundle, manifest })
    }

    /// Encode and scale rows without classifying them.
    ///
    /// # Errors
    /// Returns error if a row does not match the raw schema or holds a
    /// rejected category.
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Frame, ThyrocastError> {
        let encoded = self.bundle.encoder.transform(rows)?;
        Ok(self.bundle.scaler.transform(&encoded)?)
    }

    /// Predict one label per row, in input order.
    ///
    /// # Errors
    /// Returns error if any row fails validation or encoding; no partial
    /// result is returned.
    pub fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<String>, ThyrocastError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let scaled = self.transform(rows)?;
        let labels = self.bundle.classifier.predict(&scaled)?;
        tracing::debug!("Predicted {} rows", labels.len());
        Ok(labels)
    }

    /// Validate a form submission and predict it.
    ///
    /// # Errors
    /// Returns `Validation` for out-of-range input and pipeline errors
    /// otherwise.
    pub fn predict_patient(&self, patient: &PatientFeatures) -> Result<Prediction, ThyrocastError> {
        patient
            .validate()
            .map_err(|errors| ThyrocastError::Validation(errors.join("; ")))?;

        let label = self
            .predict(&[patient.to_row()])?
            .into_iter()
            .next()
            .ok_or_else(|| ThyrocastError::Validation("no prediction produced".to_string()))?;

        let prediction = Prediction::new(label);
        tracing::info!(
            "Prediction {} complete: label={}",
            prediction.id,
            prediction.label
        );
        Ok(prediction)
    }

    /// Labels the classifier can emit.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.bundle.classifier.labels()
    }

    /// Column layout after encoding, identical to the fit-time layout.
    #[must_use]
    pub fn encoded_schema(&self) -> &FeatureSchema {
        self.bundle.encoder.output_schema()
    }

    #[must_use]
    pub fn unknown_category_policy(&self) -> UnknownCategoryPolicy {
        self.bundle.encoder.policy()
    }

    /// Manifest the artifacts were verified against, if one was present.
    #[must_use]
    pub fn manifest(&self) -> Option<&ArtifactManifest> {
        self.manifest.as_ref()
    }
}
