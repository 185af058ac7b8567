//! Errors raised while fitting or replaying the preprocessing pipeline.

/// Error type for pipeline transforms and the classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Schema mismatch at {stage}: {detail}")]
    SchemaMismatch { stage: &'static str, detail: String },

    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Invalid value for column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Classifier error: {0}")]
    Classifier(String),
}

impl PipelineError {
    pub(crate) fn invalid_value(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
