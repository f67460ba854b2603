//! Row snapshot type.

use std::sync::Arc;

use super::value::ColumnValue;

/// An owned copy of one fetched row.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values.
    values: Vec<ColumnValue>,
    /// Shared column names (reference counted).
    names: Arc<[String]>,
}

impl Row {
    /// Create a new row with values and shared column names.
    pub fn new(values: Vec<ColumnValue>, names: Arc<[String]>) -> Self {
        Self { values, names }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.values.get(index)
    }

    /// Get value by column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&ColumnValue> {
        let name_upper = name.to_uppercase();
        self.names
            .iter()
            .position(|n| n.to_uppercase() == name_upper)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnValue> {
        self.values.iter()
    }
}

impl IntoIterator for Row {
    type Item = ColumnValue;
    type IntoIter = std::vec::IntoIter<ColumnValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a ColumnValue;
    type IntoIter = std::slice::Iter<'a, ColumnValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_names() -> Arc<[String]> {
        Arc::from(vec!["NAME".to_string(), "PAYLOAD".to_string()])
    }

    #[test]
    fn test_row_access() {
        let row = Row::new(
            vec![
                ColumnValue::Text("test".to_string()),
                ColumnValue::Bytes(vec![1, 2]),
            ],
            make_test_names(),
        );

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(0), Some(&ColumnValue::Text("test".to_string())));
        assert_eq!(
            row.get_by_name("payload"),
            Some(&ColumnValue::Bytes(vec![1, 2]))
        );
        assert_eq!(row.get_by_name("PAYLOAD"), row.get_by_name("payload"));
        assert_eq!(row.get_by_name("missing"), None);
        assert_eq!(row.column_names(), vec!["NAME", "PAYLOAD"]);
    }

    #[test]
    fn test_row_into_iter() {
        let row = Row::new(vec![ColumnValue::Null, ColumnValue::Null], make_test_names());
        assert_eq!(row.iter().filter(|v| v.is_null()).count(), 2);
        let values: Vec<ColumnValue> = row.into_iter().collect();
        assert_eq!(values.len(), 2);
    }
}
