//! Patient feature types for thyroid cancer recurrence prediction.
//!
//! Two shapes are provided:
//! - [`FeatureRow`]: an ordered column name → value mapping, the shape the
//!   pipeline consumes and the CSV adapter produces
//! - [`PatientFeatures`]: typed fields collected by the input form

use serde::{Deserialize, Serialize};

use super::schema::{self, ColumnKind, FeatureSchema, AGE, CATEGORICAL_COLUMNS, RAW_COLUMNS};
use super::PipelineError;

/// A single cell of a feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Category(String),
}

impl FeatureValue {
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Category(_) => None,
        }
    }

    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Category(s) => Some(s),
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Category(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

impl From<u32> for FeatureValue {
    fn from(v: u32) -> Self {
        Self::Numeric(f64::from(v))
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Category(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        Self::Category(v)
    }
}

/// One patient's clinical attributes as an ordered column → value mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FeatureValue>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the row against a schema: names, count, order and value kinds.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` for misaligned columns and `InvalidValue` when a
    /// numeric column holds a category (or the reverse) or Age is out of range.
    pub fn ensure_schema(&self, schema: &FeatureSchema, stage: &'static str) -> Result<(), PipelineError> {
        schema.ensure_matches(self.columns(), stage)?;

        for (column, value) in &self.entries {
            match (schema::column_kind(column), value) {
                (Some(ColumnKind::Numeric), FeatureValue::Numeric(v)) => {
                    if column == AGE {
                        schema::validate_age(*v)?;
                    } else if !v.is_finite() {
                        return Err(PipelineError::invalid_value(column, "not a finite number"));
                    }
                }
                (Some(ColumnKind::Numeric), FeatureValue::Category(s)) => {
                    return Err(PipelineError::invalid_value(
                        column,
                        format!("expected a number, got '{s}'"),
                    ));
                }
                (Some(ColumnKind::Categorical), FeatureValue::Numeric(v)) => {
                    return Err(PipelineError::invalid_value(
                        column,
                        format!("expected a category, got {v}"),
                    ));
                }
                (Some(ColumnKind::Categorical), FeatureValue::Category(s)) => {
                    if s.trim().is_empty() {
                        return Err(PipelineError::invalid_value(column, "empty category"));
                    }
                }
                (None, _) => {}
            }
        }
        Ok(())
    }
}

/// Clinical features collected by the input form.
///
/// Field order matches the raw schema: Age, Gender, Smoking, Hx Smoking,
/// Hx Radiothreapy, Thyroid Function, Physical Examination, Adenopathy,
/// Pathology, Focality, Risk, T, N, M, Stage, Response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFeatures {
    /// Age in years (0-110)
    pub age: u32,
    pub gender: String,
    pub smoking: String,
    pub hx_smoking: String,
    pub hx_radiotherapy: String,
    pub thyroid_function: String,
    pub physical_examination: String,
    pub adenopathy: String,
    pub pathology: String,
    pub focality: String,
    pub risk: String,
    /// Tumour size (T)
    pub tumour: String,
    /// Lymph nodes (N)
    pub nodes: String,
    /// Metastasis (M)
    pub metastasis: String,
    pub stage: String,
    pub response: String,
}

impl PatientFeatures {
    fn categorical_values(&self) -> [&str; 15] {
        [
            &self.gender,
            &self.smoking,
            &self.hx_smoking,
            &self.hx_radiotherapy,
            &self.thyroid_function,
            &self.physical_examination,
            &self.adenopathy,
            &self.pathology,
            &self.focality,
            &self.risk,
            &self.tumour,
            &self.nodes,
            &self.metastasis,
            &self.stage,
            &self.response,
        ]
    }

    /// Build features from Age plus the 15 categorical values in schema order.
    ///
    /// # Errors
    /// Returns error if `categories` does not hold exactly 15 values.
    pub fn from_values(age: u32, categories: &[&str]) -> Result<Self, String> {
        if categories.len() != CATEGORICAL_COLUMNS.len() {
            return Err(format!(
                "Expected {} categorical values, got {}",
                CATEGORICAL_COLUMNS.len(),
                categories.len()
            ));
        }
        let c = |i: usize| categories[i].to_string();

        Ok(Self {
            age,
            gender: c(0),
            smoking: c(1),
            hx_smoking: c(2),
            hx_radiotherapy: c(3),
            thyroid_function: c(4),
            physical_examination: c(5),
            adenopathy: c(6),
            pathology: c(7),
            focality: c(8),
            risk: c(9),
            tumour: c(10),
            nodes: c(11),
            metastasis: c(12),
            stage: c(13),
            response: c(14),
        })
    }

    /// Convert to a feature row in raw schema order.
    #[must_use]
    pub fn to_row(&self) -> FeatureRow {
        let mut row = FeatureRow::new().with(AGE, self.age);
        for (column, value) in RAW_COLUMNS[1..].iter().zip(self.categorical_values()) {
            row.push(*column, value);
        }
        row
    }

    /// Validate Age range and that every category is one the form offers.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = schema::validate_age(f64::from(self.age)) {
            errors.push(e.to_string());
        }

        for (def, value) in CATEGORICAL_COLUMNS.iter().zip(self.categorical_values()) {
            if !def.categories.iter().any(|c| *c == value) {
                errors.push(format!("{}: '{}' is not one of {:?}", def.name, value, def.categories));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_risk() -> PatientFeatures {
        PatientFeatures::from_values(
            45,
            &[
                "F", "No", "No", "No", "Euthyroid", "Normal", "No", "Papillary", "Uni-Focal",
                "Low", "T1a", "N0", "M0", "I", "Excellent",
            ],
        )
        .expect("15 values")
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Numeric(45.0).to_string(), "45");
        assert_eq!(FeatureValue::Numeric(45.5).to_string(), "45.5");
        assert_eq!(FeatureValue::from("T1a").to_string(), "T1a");
    }

    #[test]
    fn test_to_row_follows_raw_schema() {
        let row = low_risk().to_row();
        assert_eq!(row.len(), 16);
        assert!(row.ensure_schema(&FeatureSchema::raw(), "test").is_ok());
        assert_eq!(row.get("Age"), Some(&FeatureValue::Numeric(45.0)));
        assert_eq!(row.get("T").and_then(FeatureValue::as_category), Some("T1a"));
        assert_eq!(row.get("N").and_then(FeatureValue::as_category), Some("N0"));
    }

    #[test]
    fn test_from_values_requires_all_categories() {
        assert!(PatientFeatures::from_values(30, &["F", "No"]).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(low_risk().validate().is_ok());

        let invalid = PatientFeatures {
            age: 111,
            stage: "V".to_string(),
            ..low_risk()
        };
        let errors = invalid.validate().expect_err("age and stage invalid");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_age_boundaries_accepted() {
        for age in [0, 110] {
            let p = PatientFeatures { age, ..low_risk() };
            assert!(p.validate().is_ok());
            assert!(p.to_row().ensure_schema(&FeatureSchema::raw(), "test").is_ok());
        }
    }

    #[test]
    fn test_row_schema_errors() {
        let schema = FeatureSchema::raw();

        // Swapped column order
        let mut swapped = FeatureRow::new().with("Gender", "F").with(AGE, 40u32);
        for (column, value) in RAW_COLUMNS[2..].iter().zip(low_risk().categorical_values()[1..].iter()) {
            swapped.push(*column, *value);
        }
        assert!(matches!(
            swapped.ensure_schema(&schema, "test"),
            Err(PipelineError::SchemaMismatch { .. })
        ));

        // Category where a number belongs
        let mut wrong_kind = FeatureRow::new().with(AGE, "forty");
        for (column, value) in RAW_COLUMNS[1..].iter().zip(low_risk().categorical_values()) {
            wrong_kind.push(*column, value);
        }
        assert!(matches!(
            wrong_kind.ensure_schema(&schema, "test"),
            Err(PipelineError::InvalidValue { .. })
        ));
    }
}
