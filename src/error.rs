//! Unified error types for training and serving.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the health index service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Model loading or prediction error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Training data error.
    #[error("data error: {0}")]
    Data(#[from] DataLoadError),

    /// Model fitting or persistence error.
    #[error("training error: {0}")]
    Training(#[from] TrainingError),

    /// Request validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while acquiring the persisted classifier.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No artifact at the configured path.
    #[error("model file not found at {}. Run `health-index train` first.", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Artifact exists but could not be decoded or is inconsistent.
    #[error("model file {} is corrupt: {reason}", .path.display())]
    Corrupt {
        /// Artifact path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Artifact exists but could not be read.
    #[error("failed to read model file {}: {source}", .path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading the training CSV.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// CSV file could not be opened.
    #[error("failed to open training data {}: {source}", .path.display())]
    Open {
        /// CSV path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (bad quoting, ragged rows, unreadable bytes).
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    /// Header lacks a required column.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A feature cell is not a finite number.
    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidField {
        /// 1-based line number in the file.
        line: u64,
        /// Column name.
        column: &'static str,
        /// Offending cell.
        value: String,
    },

    /// The target cell is not 0 or 1.
    #[error("line {line}: risk must be 0 or 1, got '{value}'")]
    InvalidTarget {
        /// 1-based line number in the file.
        line: u64,
        /// Offending cell.
        value: String,
    },

    /// File has a header but no rows.
    #[error("training data contains no rows")]
    Empty,

    /// Only one target class present.
    #[error("training data contains only risk={0}; both classes are required")]
    SingleClass(u8),
}

/// Errors raised while fitting or persisting a classifier.
#[derive(Error, Debug)]
pub enum TrainingError {
    /// The numerical fit failed.
    #[error("logistic regression fit failed: {0}")]
    Fit(String),

    /// The fit produced non-finite parameters.
    #[error("fit produced non-finite parameters")]
    Diverged,

    /// Writing the artifact failed.
    #[error("failed to write model file {}: {source}", .path.display())]
    Persist {
        /// Output path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// A single field that failed boundary validation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldViolation {
    /// Field name as it appears in the request body.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Create a new violation.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Request body failed input-schema constraints.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} invalid field(s): {}", .violations.len(), summarize(.violations))]
pub struct ValidationError {
    /// Every violation found, in field order.
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_points_at_training() {
        let err = ModelError::NotFound {
            path: PathBuf::from("models/health_model.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("models/health_model.json"));
        assert!(msg.contains("health-index train"));
    }

    #[test]
    fn validation_error_lists_fields() {
        let err = ValidationError {
            violations: vec![
                FieldViolation::new("age", "must be >= 0"),
                FieldViolation::new("smoker", "must be 0 or 1"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 invalid field(s): age (must be >= 0), smoker (must be 0 or 1)"
        );
    }
}
