//! Numeric table with named columns.

use ndarray::{Array2, ArrayView1, Axis};

use crate::domain::{FeatureSchema, PipelineError};

/// A numeric matrix whose columns are labelled by a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    schema: FeatureSchema,
    data: Array2<f64>,
}

impl Frame {
    /// Wrap a matrix with its column labels.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the column count differs from the schema.
    pub fn new(schema: FeatureSchema, data: Array2<f64>) -> Result<Self, PipelineError> {
        if data.ncols() != schema.len() {
            return Err(PipelineError::SchemaMismatch {
                stage: "frame",
                detail: format!(
                    "matrix has {} columns, schema names {}",
                    data.ncols(),
                    schema.len()
                ),
            });
        }
        Ok(Self { schema, data })
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    /// Value of a named column in a given row.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.schema.position(column)?;
        self.data.get((row, col)).copied()
    }

    /// Copy of the selected rows, schema preserved.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            data: self.data.select(Axis(0), indices),
        }
    }
}
