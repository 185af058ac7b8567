//! Dataset port: labelled training rows from some source.

use crate::domain::{FeatureRow, PipelineError};

/// Errors raised while reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: missing value for '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Row {row}: invalid value for '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: PipelineError,
    },

    #[error("Dataset is empty")]
    Empty,
}

/// Feature rows in raw schema order with one label per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    pub rows: Vec<FeatureRow>,
    pub labels: Vec<String>,
}

impl LabeledDataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pair each row with its label.
    pub fn into_samples(self) -> Vec<(FeatureRow, String)> {
        self.rows.into_iter().zip(self.labels).collect()
    }
}

/// Trait for anything that can produce a labelled dataset.
pub trait DatasetSource {
    /// Load all rows and labels.
    ///
    /// # Errors
    /// Returns error if the source cannot be read or a row is malformed.
    fn load(&self) -> Result<LabeledDataset, DatasetError>;

    /// Short description of the source, for logs.
    fn describe(&self) -> String;
}

impl DatasetSource for LabeledDataset {
    fn load(&self) -> Result<LabeledDataset, DatasetError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory dataset ({} rows)", self.rows.len())
    }
}
