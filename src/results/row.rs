use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a database query result
///
/// This struct represents a single row from a database query result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    // shared name -> index map, built once per result set
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

pub(crate) fn column_index(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    Arc::new(
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    )
}

impl CustomDbRow {
    /// Create a new database row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = column_index(&column_names);
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    ///
    /// Exact matches win; otherwise the first column whose name matches ignoring ASCII case is
    /// returned. PostgreSQL folds unquoted aliases to lower case, so this keeps property lookups
    /// working against hand-written SQL.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let row = CustomDbRow::new(
            Arc::new(vec!["Id".to_string(), "name".to_string()]),
            vec![RowValues::Int(1), RowValues::Text("a".into())],
        );
        assert_eq!(row.get("Id"), Some(&RowValues::Int(1)));
        assert_eq!(row.get("Name"), Some(&RowValues::Text("a".into())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_by_index(1), Some(&RowValues::Text("a".into())));
    }
}
