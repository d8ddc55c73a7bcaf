use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DbError, Result};
use crate::types::SqlValue;

/// Driver-agnostic raw result from a single execution.
#[derive(Debug, Clone, Default)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fixed mapping between column names and positions.
///
/// Built once when a cursor is created and shared by every row it yields.
/// If a name appears more than once, lookups by name resolve to the first
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Columns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Self { names, positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A single row read from a cursor.
/// Values are accessible both by column name and by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row; the number of values must match the column count.
    pub fn new(columns: Arc<Columns>, values: Vec<SqlValue>) -> Result<Self> {
        if values.len() != columns.len() {
            return Err(DbError::ColumnCountMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    /// Gets a value by column name.
    pub fn get(&self, name: &str) -> Result<&SqlValue> {
        self.columns
            .position(name)
            .map(|i| &self.values[i])
            .ok_or_else(|| DbError::ColumnNotFound(name.to_string()))
    }

    /// Gets a value by zero-based column position.
    pub fn get_index(&self, index: usize) -> Result<&SqlValue> {
        self.values
            .get(index)
            .ok_or(DbError::ColumnIndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
