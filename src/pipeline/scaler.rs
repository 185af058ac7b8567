//! Robust scaler: `(x - median) / IQR` per column.
//!
//! Quantiles use linear interpolation between order statistics at position
//! `q * (n - 1)`. A column whose interquartile range is zero (every one-hot
//! column that is constant in training, for instance) keeps a scale of 1.0
//! so it is centered but never divided by zero.

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, PipelineError};

use super::Frame;

/// Fitted robust scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    schema: FeatureSchema,
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    /// Learn per-column median and IQR from an encoded frame.
    ///
    /// # Errors
    /// Returns `EmptyInput` for a frame without rows and `InvalidValue` for
    /// non-finite entries.
    pub fn fit(frame: &Frame) -> Result<Self, PipelineError> {
        if frame.nrows() == 0 {
            return Err(PipelineError::EmptyInput("no rows to fit the scaler on"));
        }
        ensure_finite(frame)?;

        let mut center = Vec::with_capacity(frame.ncols());
        let mut scale = Vec::with_capacity(frame.ncols());
        let mut constant = 0;

        for column in frame.data().axis_iter(Axis(1)) {
            let mut sorted = column.to_vec();
            sorted.sort_by(f64::total_cmp);

            let median = quantile(&sorted, 0.5);
            let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);

            center.push(median);
            if iqr == 0.0 {
                constant += 1;
                scale.push(1.0);
            } else {
                scale.push(iqr);
            }
        }

        tracing::debug!(
            "Scaler fitted on {} rows x {} columns ({} with zero IQR)",
            frame.nrows(),
            frame.ncols(),
            constant
        );

        Ok(Self {
            schema: frame.schema().clone(),
            center,
            scale,
        })
    }

    /// Scale a frame with the fitted statistics.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if the frame's columns differ from the fitted
    /// columns and `InvalidValue` for non-finite entries.
    pub fn transform(&self, frame: &Frame) -> Result<Frame, PipelineError> {
        self.schema.ensure_same(frame.schema(), "scaler transform")?;
        ensure_finite(frame)?;

        let center = Array1::from(self.center.clone());
        let scale = Array1::from(self.scale.clone());
        let scaled = (frame.data() - &center) / &scale;

        Frame::new(self.schema.clone(), scaled)
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Per-column medians.
    #[must_use]
    pub fn center(&self) -> &[f64] {
        &self.center
    }

    /// Per-column interquartile ranges (1.0 where the IQR was zero).
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

/// Linearly interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn ensure_finite(frame: &Frame) -> Result<(), PipelineError> {
    for (r, row) in frame.data().axis_iter(Axis(0)).enumerate() {
        if let Some(c) = row.iter().position(|v| !v.is_finite()) {
            let column = frame.schema().columns()[c].clone();
            return Err(PipelineError::invalid_value(
                column,
                format!("non-finite value in row {r}"),
            ));
        }
    }
    Ok(())
}
