//! Column schema for the thyroid recurrence dataset.
//!
//! The raw feature order is fixed: `Age` followed by the 15 categorical
//! columns in dataset order. Every frame that moves between pipeline stages
//! carries a [`FeatureSchema`] so column alignment is checked rather than
//! assumed.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Numeric age column.
pub const AGE: &str = "Age";

/// Label column of the training dataset.
pub const LABEL_COLUMN: &str = "Recurred";

/// Accepted age range in years.
pub const AGE_RANGE: RangeInclusive<u32> = 0..=110;

/// A categorical column and the values the input form offers for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoricalColumn {
    pub name: &'static str,
    pub categories: &'static [&'static str],
}

const YES_NO: &[&str] = &["Yes", "No"];

/// Categorical columns in raw schema order.
pub static CATEGORICAL_COLUMNS: [CategoricalColumn; 15] = [
    CategoricalColumn {
        name: "Gender",
        categories: &["F", "M"],
    },
    CategoricalColumn {
        name: "Smoking",
        categories: YES_NO,
    },
    CategoricalColumn {
        name: "Hx Smoking",
        categories: YES_NO,
    },
    CategoricalColumn {
        name: "Hx Radiothreapy",
        categories: YES_NO,
    },
    CategoricalColumn {
        name: "Thyroid Function",
        categories: &[
            "Euthyroid",
            "Clinical Hyperthyroidism",
            "Clinical Hypothyroidism",
            "Subclinical Hyperthyroidism",
            "Subclinical Hypothyroidism",
        ],
    },
    CategoricalColumn {
        name: "Physical Examination",
        categories: &[
            "Normal",
            "Single nodular goiter-left",
            "Single nodular goiter-right",
            "Multinodular goiter",
            "Diffuse goiter",
        ],
    },
    CategoricalColumn {
        name: "Adenopathy",
        categories: &["No", "Right", "Left", "Extensive", "Bilateral", "Posterior"],
    },
    CategoricalColumn {
        name: "Pathology",
        categories: &["Micropapillary", "Papillary", "Follicular", "Hurthel cell"],
    },
    CategoricalColumn {
        name: "Focality",
        categories: &["Uni-Focal", "Multi-Focal"],
    },
    CategoricalColumn {
        name: "Risk",
        categories: &["Low", "Intermediate", "High"],
    },
    CategoricalColumn {
        name: "T",
        categories: &["T1a", "T1b", "T2", "T3a", "T3b", "T4a", "T4b"],
    },
    CategoricalColumn {
        name: "N",
        categories: &["N0", "N1a", "N1b"],
    },
    CategoricalColumn {
        name: "M",
        categories: &["M0", "M1"],
    },
    CategoricalColumn {
        name: "Stage",
        categories: &["I", "II", "III", "IVA", "IVB"],
    },
    CategoricalColumn {
        name: "Response",
        categories: &[
            "Indeterminate",
            "Excellent",
            "Structural Incomplete",
            "Biochemical Incomplete",
        ],
    },
];

/// Raw feature columns, in the order every inference row must use.
pub const RAW_COLUMNS: [&str; 16] = [
    AGE,
    "Gender",
    "Smoking",
    "Hx Smoking",
    "Hx Radiothreapy",
    "Thyroid Function",
    "Physical Examination",
    "Adenopathy",
    "Pathology",
    "Focality",
    "Risk",
    "T",
    "N",
    "M",
    "Stage",
    "Response",
];

/// How a raw column is treated by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Kind of a raw column, `None` if the column is not part of the schema.
#[must_use]
pub fn column_kind(name: &str) -> Option<ColumnKind> {
    if name == AGE {
        Some(ColumnKind::Numeric)
    } else if categorical_column(name).is_some() {
        Some(ColumnKind::Categorical)
    } else {
        None
    }
}

/// Look up a categorical column definition by name.
#[must_use]
pub fn categorical_column(name: &str) -> Option<&'static CategoricalColumn> {
    CATEGORICAL_COLUMNS.iter().find(|c| c.name == name)
}

/// Validate an age value and convert it to the integer it must represent.
///
/// # Errors
/// Returns `InvalidValue` for non-finite, fractional or out-of-range ages.
pub fn validate_age(age: f64) -> Result<u32, PipelineError> {
    if !age.is_finite() || age.fract() != 0.0 {
        return Err(PipelineError::invalid_value(
            AGE,
            format!("{age} is not a whole number of years"),
        ));
    }
    let (min, max) = (*AGE_RANGE.start(), *AGE_RANGE.end());
    if age < f64::from(min) || age > f64::from(max) {
        return Err(PipelineError::invalid_value(
            AGE,
            format!("{age} out of range [{min}, {max}]"),
        ));
    }
    Ok(age as u32)
}

/// Ordered list of column names carried between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from column names.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// The raw feature schema expected by the encoder.
    #[must_use]
    pub fn raw() -> Self {
        Self::new(RAW_COLUMNS)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check that `actual` names exactly these columns in the same order.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` naming the first difference.
    pub fn ensure_matches<'a, I>(&self, actual: I, stage: &'static str) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let actual: Vec<&str> = actual.into_iter().collect();
        if actual.len() != self.columns.len() {
            return Err(PipelineError::SchemaMismatch {
                stage,
                detail: format!(
                    "expected {} columns, got {}",
                    self.columns.len(),
                    actual.len()
                ),
            });
        }
        for (i, (expected, got)) in self.columns.iter().zip(actual).enumerate() {
            if expected != got {
                return Err(PipelineError::SchemaMismatch {
                    stage,
                    detail: format!("column {i}: expected '{expected}', got '{got}'"),
                });
            }
        }
        Ok(())
    }

    /// Check that another schema is identical to this one.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` naming the first difference.
    pub fn ensure_same(&self, other: &FeatureSchema, stage: &'static str) -> Result<(), PipelineError> {
        self.ensure_matches(other.columns.iter().map(String::as_str), stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_columns_cover_all_categoricals() {
        assert_eq!(RAW_COLUMNS[0], AGE);
        for (col, def) in RAW_COLUMNS[1..].iter().zip(CATEGORICAL_COLUMNS.iter()) {
            assert_eq!(*col, def.name);
        }
        assert_eq!(column_kind("Age"), Some(ColumnKind::Numeric));
        assert_eq!(column_kind("Stage"), Some(ColumnKind::Categorical));
        assert_eq!(column_kind("Recurred"), None);
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(validate_age(0.0).expect("0 is valid"), 0);
        assert_eq!(validate_age(110.0).expect("110 is valid"), 110);
        assert!(validate_age(111.0).is_err());
        assert!(validate_age(-1.0).is_err());
        assert!(validate_age(45.5).is_err());
        assert!(validate_age(f64::NAN).is_err());
    }

    #[test]
    fn test_schema_mismatch_reports_first_difference() {
        let schema = FeatureSchema::new(["a", "b", "c"]);
        assert!(schema.ensure_matches(["a", "b", "c"], "test").is_ok());

        let err = schema
            .ensure_matches(["a", "c", "b"], "test")
            .expect_err("order differs");
        assert!(err.to_string().contains("column 1"));

        let err = schema
            .ensure_matches(["a", "b"], "test")
            .expect_err("count differs");
        assert!(err.to_string().contains("expected 3 columns, got 2"));
    }
}
