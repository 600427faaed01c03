//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries, keyed by name without the `$` prefix.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
///
/// Driver adapters yield rows as the driver hands them over.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Column values are kept as JSON regardless of the driver that produced
/// them, with typed extraction via [`Row::get`].
#[derive(Debug, Clone)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or if deserialization fails.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let name: String = row.get("student_name")?;
    /// let id: i64 = row.get("class_id")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> Result<T, AppError> {
        let value = self.data.get(column).ok_or_else(|| {
            AppError::Internal(format!("column '{}' missing from result row", column))
        })?;
        T::deserialize(value).map_err(|e| {
            AppError::Internal(format!("column '{}' has an unexpected value: {}", column, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, JsonValue)]) -> Row {
        Row::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_row_get_string() {
        let row = row(&[("student_name", json!("Cara"))]);
        let name: String = row.get("student_name").unwrap();
        assert_eq!(name, "Cara");
    }

    #[test]
    fn test_row_get_number() {
        let row = row(&[("class_id", json!(2433))]);
        let id: i64 = row.get("class_id").unwrap();
        assert_eq!(id, 2433);
    }

    #[test]
    fn test_row_get_list() {
        let row = row(&[("overlap_titles", json!(["Database", "Data Science"]))]);
        let titles: Vec<String> = row.get("overlap_titles").unwrap();
        assert_eq!(titles, vec!["Database", "Data Science"]);
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::new(HashMap::new());
        let result: Result<String, _> = row.get("missing");
        assert!(matches!(result, Err(AppError::Internal(msg)) if msg.contains("missing")));
    }

    #[test]
    fn test_row_get_wrong_type() {
        let row = row(&[("credits", json!("three"))]);
        let result: Result<i64, _> = row.get("credits");
        assert!(result.is_err());
    }
}
