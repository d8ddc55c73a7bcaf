use crate::error::{DbError, Result};
use crate::types::{Columns, Row};

/// Forward-only sequence of rows produced by executing a statement.
///
/// Cursors are finite and not guaranteed to be restartable. The column
/// layout is fixed when the cursor is created.
pub trait Cursor: Send {
    /// Column layout shared by every row of this cursor.
    fn columns(&self) -> Result<&Columns> {
        Err(DbError::not_implemented("columns"))
    }

    /// Advance the cursor. Returns `Ok(None)` once exhausted.
    fn next_row(&mut self) -> Result<Option<Row>> {
        Err(DbError::not_implemented("next_row"))
    }

    /// Identifier of the last row inserted by the execution that produced
    /// this cursor.
    fn last_row_id(&self) -> Result<i64> {
        Err(DbError::not_implemented("last_row_id"))
    }

    fn close(&mut self) -> Result<()> {
        Err(DbError::not_implemented("close cursor"))
    }

    /// Iterate the remaining rows. Iteration ends after the first error.
    fn rows(&mut self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows {
            cursor: self,
            done: false,
        }
    }
}

/// Iterator over the remaining rows of a [`Cursor`].
pub struct Rows<'c, C: Cursor> {
    cursor: &'c mut C,
    done: bool,
}

impl<C: Cursor> Iterator for Rows<'_, C> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
