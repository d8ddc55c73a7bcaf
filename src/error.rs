use thiserror::Error;

/// Error type for dbinterface operations
#[derive(Debug, Error)]
pub enum DbError {
    /// The driver does not provide this operation.
    #[error("Operation not implemented by driver: {operation}")]
    NotImplemented { operation: &'static str },

    /// Parameter sets have inconsistent shapes.
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// Driver-specific failure that fits no other kind.
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{0} is closed")]
    Closed(&'static str),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column index {index} out of range for {len} column(s)")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("Row has {actual} value(s) but {expected} column(s)")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl DbError {
    pub fn not_implemented(operation: &'static str) -> Self {
        DbError::NotImplemented { operation }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, DbError::NotImplemented { .. })
    }
}

/// Result type alias for dbinterface operations
pub type Result<T> = std::result::Result<T, DbError>;

/// Non-fatal advisory surfaced by a driver, e.g. value truncation.
/// Warnings never abort the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub code: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Log the warning through `tracing`.
    pub fn emit(&self) {
        match &self.code {
            Some(code) => tracing::warn!(code = %code, "{}", self.message),
            None => tracing::warn!("{}", self.message),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}
