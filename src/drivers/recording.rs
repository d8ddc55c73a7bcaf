use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::ConnectOptions;
use crate::error::{DbError, Result};
use crate::traits::{Connection, Driver, Statement};
use crate::types::{MemoryCursor, Params, RawQueryResult, SqlValue};

/// A recorded statement execution for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExecution {
    pub sql: String,
    pub params: Params,
}

#[derive(Default)]
struct State {
    responses: VecDeque<RawQueryResult>,
    default_response: RawQueryResult,
    fail_at: Option<usize>,
    refuse_connections: bool,
    connections: Vec<ConnectOptions>,
    prepared: Vec<String>,
    closed: Vec<String>,
    executions: Vec<RecordedExecution>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory database driver that records every call.
///
/// Allows configuring the results returned by executions and verifying
/// the sequence of prepared and executed statements. Connections and
/// statements created from the driver share its recording.
///
/// # Example
/// ```
/// use dbinterface::drivers::{RecordingDriver, ResultBuilder};
/// use dbinterface::types::SqlValue;
///
/// let driver = RecordingDriver::new().with_response(
///     ResultBuilder::new()
///         .columns(&["id", "name"])
///         .row([SqlValue::Int64(1), SqlValue::from("Alice")])
///         .build(),
/// );
/// driver.assert_execution_count(0);
/// ```
pub struct RecordingDriver {
    state: Arc<Mutex<State>>,
}

impl RecordingDriver {
    /// Create a new recording driver with no pre-configured responses.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Add a response to be returned by the next execution.
    /// Responses are returned in FIFO order.
    pub fn with_response(self, response: RawQueryResult) -> Self {
        lock(&self.state).responses.push_back(response);
        self
    }

    /// Add multiple responses to be returned by subsequent executions.
    pub fn with_responses(self, responses: impl IntoIterator<Item = RawQueryResult>) -> Self {
        lock(&self.state).responses.extend(responses);
        self
    }

    /// Set a default response to use when no queued responses remain.
    pub fn with_default_response(self, response: RawQueryResult) -> Self {
        lock(&self.state).default_response = response;
        self
    }

    /// Make the execution with zero-based `index` (counted across the
    /// driver) fail with [`DbError::QueryFailed`]. The failing execution is
    /// still recorded.
    pub fn fail_at_execution(self, index: usize) -> Self {
        lock(&self.state).fail_at = Some(index);
        self
    }

    /// Make every `connect` fail with [`DbError::ConnectionFailed`].
    pub fn refuse_connections(self) -> Self {
        lock(&self.state).refuse_connections = true;
        self
    }

    /// Get all recorded executions.
    pub fn executions(&self) -> Vec<RecordedExecution> {
        lock(&self.state).executions.clone()
    }

    /// Get the last recorded execution, if any.
    pub fn last_execution(&self) -> Option<RecordedExecution> {
        lock(&self.state).executions.last().cloned()
    }

    /// Query text of every prepared statement, in order.
    pub fn prepared_statements(&self) -> Vec<String> {
        lock(&self.state).prepared.clone()
    }

    /// Query text of every statement closed, in order.
    pub fn closed_statements(&self) -> Vec<String> {
        lock(&self.state).closed.clone()
    }

    /// Options of every successful connect, in order.
    pub fn connections(&self) -> Vec<ConnectOptions> {
        lock(&self.state).connections.clone()
    }

    /// Clear all recorded connects, prepares and executions.
    pub fn clear_recorded(&self) {
        let mut state = lock(&self.state);
        state.connections.clear();
        state.prepared.clear();
        state.closed.clear();
        state.executions.clear();
    }

    /// Assert that the last execution matches the expected SQL and parameters.
    pub fn assert_last_execution(&self, expected_sql: &str, expected_params: &Params) {
        let last = self.last_execution().expect("No executions were recorded");
        assert_eq!(
            last.sql, expected_sql,
            "SQL mismatch.\nExpected: {}\nActual: {}",
            expected_sql, last.sql
        );
        assert_eq!(
            &last.params, expected_params,
            "Parameters mismatch.\nExpected: {:?}\nActual: {:?}",
            expected_params, last.params
        );
    }

    /// Assert that exactly n executions happened.
    pub fn assert_execution_count(&self, expected: usize) {
        let actual = lock(&self.state).executions.len();
        assert_eq!(
            actual, expected,
            "Execution count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    type Connection = RecordingConnection;

    async fn connect(&self, options: &ConnectOptions) -> Result<RecordingConnection> {
        let mut state = lock(&self.state);
        if state.refuse_connections {
            return Err(DbError::ConnectionFailed(format!(
                "{} refused the connection",
                options.target
            )));
        }
        state.connections.push(options.clone());
        drop(state);

        tracing::debug!(dsn = %options.target, "recording connection opened");
        Ok(RecordingConnection {
            state: Arc::clone(&self.state),
            open: Arc::new(AtomicBool::new(true)),
        })
    }
}

/// Connection handed out by [`RecordingDriver`].
pub struct RecordingConnection {
    state: Arc<Mutex<State>>,
    open: Arc<AtomicBool>,
}

impl RecordingConnection {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DbError::Closed("connection"))
        }
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    type Statement = RecordingStatement;

    async fn prepare(&self, sql: &str) -> Result<RecordingStatement> {
        self.ensure_open()?;
        lock(&self.state).prepared.push(sql.to_string());
        Ok(RecordingStatement {
            sql: sql.to_string(),
            state: Arc::clone(&self.state),
            connection_open: Arc::clone(&self.open),
            closed: false,
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.open.store(false, Ordering::Release);
        tracing::debug!("recording connection closed");
        Ok(())
    }
}

/// Statement handed out by [`RecordingConnection`].
/// Unusable once it or its connection has been closed.
pub struct RecordingStatement {
    sql: String,
    state: Arc<Mutex<State>>,
    connection_open: Arc<AtomicBool>,
    closed: bool,
}

impl RecordingStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn ensure_usable(&self) -> Result<()> {
        if !self.connection_open.load(Ordering::Acquire) {
            return Err(DbError::Closed("connection"));
        }
        if self.closed {
            return Err(DbError::Closed("statement"));
        }
        Ok(())
    }

    /// Record one execution and pick its response.
    /// Returns the response together with the execution's index.
    fn record(&self, params: &Params) -> Result<(RawQueryResult, usize)> {
        let mut state = lock(&self.state);
        let index = state.executions.len();
        state.executions.push(RecordedExecution {
            sql: self.sql.clone(),
            params: params.clone(),
        });

        if state.fail_at == Some(index) {
            return Err(DbError::QueryFailed(format!(
                "injected failure at execution {}",
                index
            )));
        }

        let response = match state.responses.pop_front() {
            Some(response) => response,
            None => state.default_response.clone(),
        };
        Ok((response, index))
    }
}

#[async_trait]
impl Statement for RecordingStatement {
    type Cursor = MemoryCursor;

    async fn execute(&mut self, params: &Params) -> Result<MemoryCursor> {
        self.ensure_usable()?;
        let (response, index) = self.record(params)?;
        // Row ids start at 1, one per execution.
        Ok(MemoryCursor::from_raw(response)?.with_last_row_id(index as i64 + 1))
    }

    async fn close(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.closed = true;
        lock(&self.state).closed.push(self.sql.clone());
        Ok(())
    }
}

/// Builder for creating responses easily.
pub struct ResultBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the response.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of values.
    pub fn row(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }

    /// Build the RawQueryResult.
    pub fn build(self) -> RawQueryResult {
        RawQueryResult::new(self.columns, self.rows)
    }
}

impl Default for ResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}
