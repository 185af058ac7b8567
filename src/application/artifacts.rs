//! Fitted pipeline artifacts and the manifest that binds them.
//!
//! Training writes three JSON artifacts (classifier, encoder, scaler) and a
//! `manifest.json` holding the SHA-256 of each plus the run parameters. On
//! load every artifact listed in the manifest must hash to the recorded
//! value, and the three stages must agree on the encoded schema.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::StoreError;
use crate::domain::FeatureSchema;
use crate::pipeline::{OneHotEncoder, RecurrenceClassifier, RobustScaler, UnknownCategoryPolicy};
use crate::ports::ArtifactStore;
use crate::ThyrocastError;

/// Serialized Gaussian NB classifier.
pub const MODEL_ARTIFACT: &str = "gb_model.json";
/// Serialized one-hot encoder.
pub const ENCODER_ARTIFACT: &str = "model_encoder.json";
/// Serialized robust scaler.
pub const SCALER_ARTIFACT: &str = "model_scaler.json";
pub const MANIFEST_ARTIFACT: &str = "manifest.json";

/// Manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Record of one training run and the artifacts it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub seed: u64,
    pub test_fraction: f64,
    pub unknown_category: UnknownCategoryPolicy,
    pub raw_columns: FeatureSchema,
    pub encoded_columns: FeatureSchema,
    pub labels: Vec<String>,
    /// Artifact name -> SHA-256 hex digest
    pub files: BTreeMap<String, String>,
}

/// Parameters of the run that produced a bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParameters {
    pub seed: u64,
    pub test_fraction: f64,
}

/// The three fitted stages, always handled together.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub encoder: OneHotEncoder,
    pub scaler: RobustScaler,
    pub classifier: RecurrenceClassifier,
}

impl ModelBundle {
    /// Check that each stage consumes exactly what the previous one produces.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` naming the first disagreeing boundary.
    pub fn check_coupling(&self) -> Result<(), ThyrocastError> {
        let encoded = self.encoder.output_schema();
        encoded.ensure_same(self.scaler.schema(), "encoder -> scaler")?;
        encoded.ensure_same(self.classifier.schema(), "scaler -> classifier")?;
        Ok(())
    }

    /// Serialize all stages, write them, then write the manifest.
    ///
    /// The manifest goes last so a store never holds a manifest that
    /// references artifacts from a different run.
    ///
    /// # Errors
    /// Returns error if serialization or any store write fails.
    pub fn save<S>(&self, store: &S, params: RunParameters) -> Result<ArtifactManifest, ThyrocastError>
    where
        S: ArtifactStore,
        S::Error: Into<StoreError>,
    {
        self.check_coupling()?;

        let artifacts = [
            (MODEL_ARTIFACT, serde_json::to_vec_pretty(&self.classifier)?),
            (ENCODER_ARTIFACT, serde_json::to_vec_pretty(&self.encoder)?),
            (SCALER_ARTIFACT, serde_json::to_vec_pretty(&self.scaler)?),
        ];

        let mut files = BTreeMap::new();
        for (name, bytes) in &artifacts {
            store
                .put(name, bytes)
                .map_err(|e| ThyrocastError::Storage(e.into()))?;
            files.insert((*name).to_string(), sha256_hex(bytes));
        }

        let manifest = ArtifactManifest {
            version: MANIFEST_VERSION,
            created_at: Utc::now(),
            seed: params.seed,
            test_fraction: params.test_fraction,
            unknown_category: self.encoder.policy(),
            raw_columns: self.encoder.input_schema().clone(),
            encoded_columns: self.encoder.output_schema().clone(),
            labels: self.classifier.labels().to_vec(),
            files,
        };
        store
            .put(MANIFEST_ARTIFACT, &serde_json::to_vec_pretty(&manifest)?)
            .map_err(|e| ThyrocastError::Storage(e.into()))?;

        tracing::info!(
            "Saved {} artifacts and manifest to {}",
            artifacts.len(),
            store.location()
        );
        Ok(manifest)
    }

    /// Load and verify all stages from a store.
    ///
    /// # Errors
    /// Returns `ArtifactMissing` for an absent artifact, `ArtifactIntegrity`
    /// for a hash or manifest disagreement, and `SchemaMismatch` when the
    /// stages do not couple.
    pub fn load<S>(store: &S) -> Result<(Self, Option<ArtifactManifest>), ThyrocastError>
    where
        S: ArtifactStore,
        S::Error: Into<StoreError>,
    {
        let manifest = match read(store, MANIFEST_ARTIFACT)? {
            Some(bytes) => {
                let manifest: ArtifactManifest = serde_json::from_slice(&bytes)?;
                if manifest.version != MANIFEST_VERSION {
                    return Err(ThyrocastError::ArtifactIntegrity {
                        name: MANIFEST_ARTIFACT.to_string(),
                        reason: format!("unsupported manifest version {}", manifest.version),
                    });
                }
                Some(manifest)
            }
            None => {
                tracing::warn!(
                    "No {} in {}, artifact hashes will not be verified",
                    MANIFEST_ARTIFACT,
                    store.location()
                );
                None
            }
        };

        let load_one = |name: &str| -> Result<Vec<u8>, ThyrocastError> {
            let bytes = read(store, name)?.ok_or_else(|| ThyrocastError::ArtifactMissing(name.to_string()))?;
            if let Some(manifest) = &manifest {
                verify_hash(manifest, name, &bytes)?;
            }
            Ok(bytes)
        };

        let classifier: RecurrenceClassifier = serde_json::from_slice(&load_one(MODEL_ARTIFACT)?)?;
        let encoder: OneHotEncoder = serde_json::from_slice(&load_one(ENCODER_ARTIFACT)?)?;
        let scaler: RobustScaler = serde_json::from_slice(&load_one(SCALER_ARTIFACT)?)?;

        let bundle = Self {
            encoder,
            scaler,
            classifier,
        };
        bundle.check_coupling()?;

        if let Some(manifest) = &manifest {
            if &manifest.encoded_columns != bundle.encoder.output_schema()
                || manifest.labels != bundle.classifier.labels()
            {
                return Err(ThyrocastError::ArtifactIntegrity {
                    name: MANIFEST_ARTIFACT.to_string(),
                    reason: "manifest schema or labels disagree with the artifacts".to_string(),
                });
            }
        }

        tracing::info!(
            "Loaded pipeline from {}: {} encoded features, labels {:?}",
            store.location(),
            bundle.encoder.output_schema().len(),
            bundle.classifier.labels()
        );
        Ok((bundle, manifest))
    }
}

fn read<S>(store: &S, name: &str) -> Result<Option<Vec<u8>>, ThyrocastError>
where
    S: ArtifactStore,
    S::Error: Into<StoreError>,
{
    store.get(name).map_err(|e| ThyrocastError::Storage(e.into()))
}

fn verify_hash(manifest: &ArtifactManifest, name: &str, bytes: &[u8]) -> Result<(), ThyrocastError> {
    let expected = manifest
        .files
        .get(name)
        .ok_or_else(|| ThyrocastError::ArtifactIntegrity {
            name: name.to_string(),
            reason: "not listed in manifest".to_string(),
        })?;
    if !constant_time_eq_str(&sha256_hex(bytes), expected) {
        return Err(ThyrocastError::ArtifactIntegrity {
            name: name.to_string(),
            reason: "SHA-256 does not match manifest".to_string(),
        });
    }
    Ok(())
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII strings (SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "ab"));
    }
}
