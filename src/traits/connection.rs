use async_trait::async_trait;

use crate::error::{DbError, Result};
use crate::traits::Statement;
use crate::types::{Batch, Params};

/// Cursor type produced by a connection's statements.
pub type CursorOf<C> = <<C as Connection>::Statement as Statement>::Cursor;

/// A live link to a database, created by [`Driver::connect`](crate::traits::Driver::connect).
///
/// The convenience methods taking query text prepare a fresh statement
/// and drop it once it has run.
#[async_trait]
pub trait Connection: Send + Sync {
    type Statement: Statement;

    async fn prepare(&self, _sql: &str) -> Result<Self::Statement> {
        Err(DbError::not_implemented("prepare"))
    }

    async fn close(&mut self) -> Result<()> {
        Err(DbError::not_implemented("close connection"))
    }

    /// Prepare `sql` and execute it once.
    async fn execute(&self, sql: &str, params: &Params) -> Result<CursorOf<Self>> {
        let mut statement = self.prepare(sql).await?;
        statement.execute(params).await
    }

    /// Prepare `sql` and run it across `batch`.
    /// See [`Statement::execute_many`].
    async fn execute_many(&self, sql: &str, batch: &Batch) -> Result<()> {
        // Reject a malformed batch before touching the driver.
        batch.validate()?;
        let mut statement = self.prepare(sql).await?;
        statement.execute_many(batch).await
    }

    /// Prepare `sql` and collect every result set it produces.
    async fn execute_multiple(&self, sql: &str, params: &Params) -> Result<Vec<CursorOf<Self>>> {
        let mut statement = self.prepare(sql).await?;
        statement.execute_multiple(params).await
    }
}
