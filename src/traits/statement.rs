use async_trait::async_trait;

use crate::error::{DbError, Result};
use crate::traits::Cursor;
use crate::types::{Batch, Params};

/// A validated, pre-parsed query bound to the connection that prepared it.
///
/// A statement is only usable while its owning connection is open.
/// Drivers override the operations they support; everything else fails
/// with [`DbError::NotImplemented`].
#[async_trait]
pub trait Statement: Send {
    type Cursor: Cursor;

    /// Execute once with the given parameters.
    async fn execute(&mut self, _params: &Params) -> Result<Self::Cursor> {
        Err(DbError::not_implemented("execute"))
    }

    async fn close(&mut self) -> Result<()> {
        Err(DbError::not_implemented("close statement"))
    }

    /// Execute once per index of `batch`, discarding each cursor.
    ///
    /// The whole batch is validated before the first execution; a
    /// length mismatch fails with [`DbError::Parameter`] and runs nothing.
    /// With no collections the statement runs once without parameters.
    /// Executions are sequential in ascending index order and the first
    /// failure aborts the rest. Rolling back earlier executions is up to
    /// the driver.
    async fn execute_many(&mut self, batch: &Batch) -> Result<()> {
        let runs = batch.runs()?;
        tracing::debug!(executions = runs.len(), "executing batch");
        for (index, params) in runs.enumerate() {
            if let Err(e) = self.execute(&params).await {
                tracing::debug!(index, error = %e, "batch execution aborted");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Execute a statement that may produce several result sets.
    /// Defaults to the single cursor of [`Statement::execute`].
    async fn execute_multiple(&mut self, params: &Params) -> Result<Vec<Self::Cursor>> {
        Ok(vec![self.execute(params).await?])
    }
}
