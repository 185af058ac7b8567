//! One-hot encoder for the categorical columns.
//!
//! Fitting records, per categorical column, the categories seen in the
//! training rows in order of first appearance, followed by the rest of the
//! column's known vocabulary in declaration order. Each category becomes an
//! indicator column named `<column>_<category>` placed where the source
//! column was; numeric columns pass through unchanged. The output schema is
//! frozen at fit time and never depends on the rows being transformed.

use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::domain::schema::{self, ColumnKind};
use crate::domain::{FeatureRow, FeatureSchema, FeatureValue, PipelineError};

use super::Frame;

/// What to do with a category outside the fitted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail with `UnknownCategory`
    #[default]
    Reject,
    /// Encode the column as all zeros
    ZeroVector,
}

impl FromStr for UnknownCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "zero" | "zero-vector" | "zero_vector" => Ok(Self::ZeroVector),
            other => Err(format!(
                "unknown category policy '{other}' (expected 'reject' or 'zero-vector')"
            )),
        }
    }
}

impl std::fmt::Display for UnknownCategoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::ZeroVector => write!(f, "zero-vector"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EncodedColumn {
    Passthrough { name: String },
    OneHot { name: String, categories: Vec<String> },
}

impl EncodedColumn {
    fn width(&self) -> usize {
        match self {
            Self::Passthrough { .. } => 1,
            Self::OneHot { categories, .. } => categories.len(),
        }
    }
}

/// Fitted one-hot encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    input_schema: FeatureSchema,
    output_schema: FeatureSchema,
    columns: Vec<EncodedColumn>,
    policy: UnknownCategoryPolicy,
}

impl OneHotEncoder {
    /// Fit the encoder on training rows shaped like the raw schema.
    ///
    /// # Errors
    /// Returns `EmptyInput` for no rows, or a schema error for any row that does
    /// not match the raw schema.
    pub fn fit(rows: &[FeatureRow], policy: UnknownCategoryPolicy) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyInput("no rows to fit the encoder on"));
        }

        let input_schema = FeatureSchema::raw();
        for row in rows {
            row.ensure_schema(&input_schema, "encoder fit")?;
        }

        let mut columns = Vec::with_capacity(input_schema.len());
        for (index, name) in input_schema.columns().iter().enumerate() {
            let column = match schema::column_kind(name) {
                Some(ColumnKind::Numeric) | None => EncodedColumn::Passthrough { name: name.clone() },
                Some(ColumnKind::Categorical) => {
                    let mut categories: Vec<String> = Vec::new();
                    for row in rows {
                        let value = category_at(row, index, name)?;
                        if !categories.iter().any(|c| c == value) {
                            categories.push(value.to_string());
                        }
                    }
                    // Valid values missing from the training rows still get an
                    // indicator; it is constant zero in training.
                    if let Some(known) = schema::categorical_column(name) {
                        for &category in known.categories {
                            if !categories.iter().any(|c| c == category) {
                                categories.push(category.to_string());
                            }
                        }
                    }
                    EncodedColumn::OneHot {
                        name: name.clone(),
                        categories,
                    }
                }
            };
            columns.push(column);
        }

        let output_schema = FeatureSchema::new(columns.iter().flat_map(|c| match c {
            EncodedColumn::Passthrough { name } => vec![name.clone()],
            EncodedColumn::OneHot { name, categories } => categories
                .iter()
                .map(|cat| format!("{name}_{cat}"))
                .collect(),
        }));

        tracing::debug!(
            "Encoder fitted on {} rows: {} raw columns -> {} encoded columns (unknown categories: {})",
            rows.len(),
            input_schema.len(),
            output_schema.len(),
            policy
        );

        Ok(Self {
            input_schema,
            output_schema,
            columns,
            policy,
        })
    }

    /// Encode rows into the fit-time indicator layout.
    ///
    /// # Errors
    /// Returns a schema error for misaligned rows and `UnknownCategory` for a
    /// category outside the vocabulary when the policy is `Reject`.
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Frame, PipelineError> {
        let mut data = Array2::<f64>::zeros((rows.len(), self.output_schema.len()));

        for (r, row) in rows.iter().enumerate() {
            row.ensure_schema(&self.input_schema, "encoder transform")?;

            let mut offset = 0;
            for (index, column) in self.columns.iter().enumerate() {
                match column {
                    EncodedColumn::Passthrough { name } => {
                        data[(r, offset)] = numeric_at(row, index, name)?;
                    }
                    EncodedColumn::OneHot { name, categories } => {
                        let value = category_at(row, index, name)?;
                        match categories.iter().position(|c| c == value) {
                            Some(k) => data[(r, offset + k)] = 1.0,
                            None => match self.policy {
                                UnknownCategoryPolicy::Reject => {
                                    return Err(PipelineError::UnknownCategory {
                                        column: name.clone(),
                                        value: value.to_string(),
                                    });
                                }
                                UnknownCategoryPolicy::ZeroVector => {}
                            },
                        }
                    }
                }
                offset += column.width();
            }
        }

        Frame::new(self.output_schema.clone(), data)
    }

    /// Categories in `row` outside the fitted vocabulary, as (column, value).
    #[must_use]
    pub fn unknown_categories<'a>(&self, row: &'a FeatureRow) -> Vec<(&str, &'a str)> {
        let mut unknown = Vec::new();
        for column in &self.columns {
            if let EncodedColumn::OneHot { name, categories } = column {
                if let Some(value) = row.get(name).and_then(FeatureValue::as_category) {
                    if !categories.iter().any(|c| c == value) {
                        unknown.push((name.as_str(), value));
                    }
                }
            }
        }
        unknown
    }

    /// Categories learned for a column, in encoded order.
    #[must_use]
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns.iter().find_map(|c| match c {
            EncodedColumn::OneHot { name, categories } if name == column => {
                Some(categories.as_slice())
            }
            _ => None,
        })
    }

    #[must_use]
    pub fn input_schema(&self) -> &FeatureSchema {
        &self.input_schema
    }

    #[must_use]
    pub fn output_schema(&self) -> &FeatureSchema {
        &self.output_schema
    }

    #[must_use]
    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }
}

fn value_at<'a>(row: &'a FeatureRow, index: usize, name: &str) -> Result<&'a FeatureValue, PipelineError> {
    row.values()
        .nth(index)
        .ok_or_else(|| PipelineError::invalid_value(name, "missing value"))
}

fn category_at<'a>(row: &'a FeatureRow, index: usize, name: &str) -> Result<&'a str, PipelineError> {
    value_at(row, index, name)?
        .as_category()
        .ok_or_else(|| PipelineError::invalid_value(name, "expected a category"))
}

fn numeric_at(row: &FeatureRow, index: usize, name: &str) -> Result<f64, PipelineError> {
    value_at(row, index, name)?
        .as_numeric()
        .ok_or_else(|| PipelineError::invalid_value(name, "expected a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{high_risk_patient, low_risk_patient};

    fn fitted(policy: UnknownCategoryPolicy) -> OneHotEncoder {
        let rows = vec![low_risk_patient().to_row(), high_risk_patient().to_row()];
        OneHotEncoder::fit(&rows, policy).expect("Encoder should fit")
    }

    #[test]
    fn test_output_schema_layout() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let cols = encoder.output_schema().columns();

        // Age passes through in first position, then indicators in first-seen order.
        assert_eq!(cols[0], "Age");
        assert_eq!(cols[1], "Gender_F");
        assert_eq!(cols[2], "Gender_M");
        // Seen categories first, then the unseen part of the vocabulary.
        assert_eq!(
            encoder.categories("Risk"),
            Some(&["Low".to_string(), "High".to_string(), "Intermediate".to_string()][..])
        );
        assert!(cols.iter().any(|c| c == "Stage_IVB"));
        assert_eq!(encoder.categories("Age"), None);
    }

    #[test]
    fn test_transform_sets_one_indicator_per_column() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let frame = encoder
            .transform(&[low_risk_patient().to_row()])
            .expect("Should encode");

        assert_eq!(frame.schema(), encoder.output_schema());
        assert_eq!(frame.get(0, "Age"), low_risk_patient().to_row().get("Age").and_then(FeatureValue::as_numeric));
        assert_eq!(frame.get(0, "Risk_Low"), Some(1.0));
        assert_eq!(frame.get(0, "Risk_High"), Some(0.0));

        // 15 categorical columns -> exactly 15 hot indicators.
        let hot: f64 = frame.row(0).iter().skip(1).sum();
        assert!((hot - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_schema_is_stable_regardless_of_input() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let one = encoder.transform(&[high_risk_patient().to_row()]).expect("encode");
        let both = encoder
            .transform(&[low_risk_patient().to_row(), high_risk_patient().to_row()])
            .expect("encode");
        assert_eq!(one.schema(), both.schema());
        assert_eq!(one.ncols(), encoder.output_schema().len());
    }

    #[test]
    fn test_valid_category_absent_from_training_is_encoded() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let mut patient = low_risk_patient();
        patient.adenopathy = "Posterior".to_string();
        patient.stage = "III".to_string();

        assert!(encoder.unknown_categories(&patient.to_row()).is_empty());
        let frame = encoder.transform(&[patient.to_row()]).expect("Should encode");
        assert_eq!(frame.get(0, "Adenopathy_Posterior"), Some(1.0));
        assert_eq!(frame.get(0, "Adenopathy_No"), Some(0.0));
        assert_eq!(frame.get(0, "Stage_III"), Some(1.0));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let mut patient = low_risk_patient();
        patient.stage = "IVC".to_string();

        let err = encoder
            .transform(&[patient.to_row()])
            .expect_err("IVC is not a known stage");
        assert_eq!(
            err,
            PipelineError::UnknownCategory {
                column: "Stage".to_string(),
                value: "IVC".to_string()
            }
        );
        assert_eq!(encoder.unknown_categories(&patient.to_row()), vec![("Stage", "IVC")]);
    }

    #[test]
    fn test_unknown_category_zero_vector() {
        let encoder = fitted(UnknownCategoryPolicy::ZeroVector);
        let mut patient = low_risk_patient();
        patient.stage = "IVC".to_string();

        let frame = encoder.transform(&[patient.to_row()]).expect("zero-encoded");
        assert_eq!(frame.get(0, "Stage_I"), Some(0.0));
        assert_eq!(frame.get(0, "Stage_IVB"), Some(0.0));
        assert_eq!(frame.ncols(), encoder.output_schema().len());
    }

    #[test]
    fn test_rejects_misaligned_rows() {
        let encoder = fitted(UnknownCategoryPolicy::Reject);
        let row = FeatureRow::new().with("Gender", "F").with("Age", 30u32);
        assert!(matches!(
            encoder.transform(&[row]),
            Err(PipelineError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_requires_rows() {
        assert!(matches!(
            OneHotEncoder::fit(&[], UnknownCategoryPolicy::Reject),
            Err(PipelineError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("reject".parse(), Ok(UnknownCategoryPolicy::Reject));
        assert_eq!("Zero-Vector".parse(), Ok(UnknownCategoryPolicy::ZeroVector));
        assert!("ignore".parse::<UnknownCategoryPolicy>().is_err());
    }
}
