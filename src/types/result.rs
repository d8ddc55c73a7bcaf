use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{DbError, Result, Warning};
use crate::traits::Cursor;
use crate::types::{Columns, RawQueryResult, Row};

/// A fully materialized cursor.
///
/// Drivers that buffer a whole result set can return this instead of
/// writing their own [`Cursor`].
#[derive(Debug)]
pub struct MemoryCursor {
    columns: Arc<Columns>,
    rows: VecDeque<Row>,
    last_row_id: Option<i64>,
    warnings: Vec<Warning>,
    closed: bool,
}

impl MemoryCursor {
    /// Creates a cursor from a raw result.
    /// Fails if any row's width differs from the column count.
    pub fn from_raw(raw: RawQueryResult) -> Result<Self> {
        let columns = Arc::new(Columns::new(raw.columns));
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect::<Result<VecDeque<_>>>()?;
        Ok(Self {
            columns,
            rows,
            last_row_id: None,
            warnings: Vec::new(),
            closed: false,
        })
    }

    pub fn empty() -> Self {
        Self {
            columns: Arc::new(Columns::default()),
            rows: VecDeque::new(),
            last_row_id: None,
            warnings: Vec::new(),
            closed: false,
        }
    }

    pub fn with_last_row_id(mut self, id: i64) -> Self {
        self.last_row_id = Some(id);
        self
    }

    /// Attach a non-fatal warning. The warning is logged as it is attached.
    pub fn with_warning(mut self, warning: Warning) -> Self {
        warning.emit();
        self.warnings.push(warning);
        self
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of rows not yet read.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Extracts the single remaining row.
    /// Returns an error if zero or more than one row remain.
    pub fn single_row(mut self) -> Result<Row> {
        if self.closed {
            return Err(DbError::Closed("cursor"));
        }
        if self.rows.len() != 1 {
            return Err(DbError::UnexpectedRowCount {
                expected: 1,
                actual: self.rows.len(),
            });
        }
        self.rows.pop_front().ok_or(DbError::UnexpectedRowCount {
            expected: 1,
            actual: 0,
        })
    }
}

impl Cursor for MemoryCursor {
    fn columns(&self) -> Result<&Columns> {
        Ok(&self.columns)
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Err(DbError::Closed("cursor"));
        }
        Ok(self.rows.pop_front())
    }

    fn last_row_id(&self) -> Result<i64> {
        self.last_row_id
            .ok_or(DbError::not_implemented("last_row_id"))
    }

    fn close(&mut self) -> Result<()> {
        self.rows.clear();
        self.closed = true;
        Ok(())
    }
}
