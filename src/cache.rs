//! Opt-in cache of prepared statements keyed by a symbolic name.
//!
//! The cache does not know which connection a statement came from. Keep one
//! cache per connection, or use a process-wide instance only with a single
//! connection that outlives it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::traits::{Connection, Statement};

/// Shared handle to a cached statement.
pub type SharedStatement<C> = Arc<Mutex<<C as Connection>::Statement>>;

pub struct StatementCache<C: Connection> {
    statements: RwLock<HashMap<String, SharedStatement<C>>>,
}

impl<C: Connection> StatementCache<C> {
    pub fn new() -> Self {
        Self {
            statements: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<SharedStatement<C>> {
        self.statements.read().await.get(key).cloned()
    }

    /// Return the statement cached under `key`, preparing `sql` on `conn`
    /// first if there is none.
    ///
    /// When two callers race on the same key, the first insert wins and the
    /// other caller's freshly prepared statement is closed.
    pub async fn get_or_prepare(&self, conn: &C, key: &str, sql: &str) -> Result<SharedStatement<C>> {
        if let Some(statement) = self.get(key).await {
            return Ok(statement);
        }

        tracing::debug!(key, "preparing statement for cache");
        let mut prepared = conn.prepare(sql).await?;

        let mut statements = self.statements.write().await;
        if let Some(existing) = statements.get(key) {
            let existing = Arc::clone(existing);
            drop(statements);
            if let Err(e) = prepared.close().await {
                tracing::debug!(key, error = %e, "failed to close duplicate statement");
            }
            return Ok(existing);
        }

        let shared = Arc::new(Mutex::new(prepared));
        statements.insert(key.to_string(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Remove a statement from the cache without closing it.
    pub async fn invalidate(&self, key: &str) -> Option<SharedStatement<C>> {
        self.statements.write().await.remove(key)
    }

    /// Close and evict every cached statement.
    ///
    /// All statements are attempted; the first close error is returned.
    pub async fn close_all(&self) -> Result<()> {
        let drained: Vec<(String, SharedStatement<C>)> =
            self.statements.write().await.drain().collect();

        let mut first_error = None;
        for (key, statement) in drained {
            if let Err(e) = statement.lock().await.close().await {
                tracing::debug!(key = %key, error = %e, "failed to close cached statement");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn len(&self) -> usize {
        self.statements.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.statements.read().await.is_empty()
    }
}

impl<C: Connection> Default for StatementCache<C> {
    fn default() -> Self {
        Self::new()
    }
}
