//! Row Construction
//!
//! Turns the split fields of one line into a caller-chosen row type.

use serde::Serialize;
use thiserror::Error;

// == Row Error ==
/// A single row that could not be admitted to the parsed content.
///
/// Holds its own copy of the raw fields so it can outlive the line buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct RowError {
    /// What went wrong
    pub message: String,
    /// The offending row's raw fields
    pub row: Vec<String>,
}

impl RowError {
    /// Creates a new RowError, copying the fields.
    pub fn new(message: impl Into<String>, row: &[String]) -> Self {
        Self {
            message: message.into(),
            row: row.to_vec(),
        }
    }

    /// The raw fields of the row that failed.
    pub fn row(&self) -> &[String] {
        &self.row
    }
}

// == Row Creator ==
/// Builds a row of type `T` from the fields of one line.
///
/// Returning `Err` records the row as failed and parsing moves on to the next
/// line. Any `Fn(&[String]) -> Result<T, RowError>` closure is a creator.
pub trait RowCreator<T> {
    fn create(&self, fields: &[String]) -> Result<T, RowError>;
}

impl<T, F> RowCreator<T> for F
where
    F: Fn(&[String]) -> Result<T, RowError>,
{
    fn create(&self, fields: &[String]) -> Result<T, RowError> {
        self(fields)
    }
}

// == Trivial Creator ==
/// Keeps every row as its list of field strings. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialCreator;

impl RowCreator<Vec<String>> for TrivialCreator {
    fn create(&self, fields: &[String]) -> Result<Vec<String>, RowError> {
        Ok(fields.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trivial_creator_copies_fields() {
        let row = fields(&["a", "b"]);
        assert_eq!(TrivialCreator.create(&row).unwrap(), row);
    }

    #[test]
    fn test_closure_creator() {
        let creator = |f: &[String]| -> Result<u32, RowError> {
            f[0].parse()
                .map_err(|_| RowError::new("not a number", f))
        };

        assert_eq!(creator.create(&fields(&["42"])), Ok(42));
        let err = creator.create(&fields(&["x", "y"])).unwrap_err();
        assert_eq!(err.message, "not a number");
        assert_eq!(err.row(), &fields(&["x", "y"])[..]);
    }

    #[test]
    fn test_row_error_display() {
        let err = RowError::new("bad row", &fields(&["1"]));
        assert_eq!(err.to_string(), "bad row");
    }
}
