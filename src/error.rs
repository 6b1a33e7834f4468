/// DataTable Error Types
///
/// Engine-level operations (ranking, filtering, sorting, pagination) never fail:
/// malformed input is normalized to a no-op. The errors below only surface at
/// the boundaries where the host hands data in or receives results back.

use crate::table::RowId;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while building a table from host-supplied rows and columns.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    #[error("duplicate row id '{0}'")]
    DuplicateRow(RowId),

    #[error("invalid row at index {index}: {reason}")]
    InvalidRow { index: usize, reason: String },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raised when raw filter input cannot be interpreted.
///
/// The filter engine treats these as "filter unset"; the error exists so a
/// host can show an inline hint if it wants to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("'{0}' is not a number")]
    MalformedNumber(String),
}

/// Serialization failures while producing an export blob.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export buffer error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Per-field validation messages returned by the host, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(field, message);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Failures reported by the host when it applies a row mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// One or more fields were rejected; shown inline next to each input.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The targeted row no longer exists. Treated as a refresh, not a failure.
    #[error("row '{0}' not found")]
    NotFound(RowId),

    #[error("mutation failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_display() {
        let errors = FieldErrors::new()
            .with("name", "The name field is required.")
            .with("email", "The email field must not be greater than 255 characters.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("The name field is required."));
        // BTreeMap keeps fields ordered
        assert_eq!(
            errors.to_string(),
            "email: The email field must not be greater than 255 characters.; name: The name field is required."
        );
    }

    #[test]
    fn test_mutation_error_messages() {
        let err = MutationError::NotFound(RowId::from(7));
        assert_eq!(err.to_string(), "row '7' not found");

        let err = FilterError::MalformedNumber("abc".to_string());
        assert_eq!(err.to_string(), "'abc' is not a number");
    }
}
