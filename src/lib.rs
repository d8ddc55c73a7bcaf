//! dbinterface - A driver-agnostic database connectivity contract
//!
//! Drivers implement [`Driver`], [`Connection`], [`Statement`] and
//! [`Cursor`]. Any operation a driver leaves out fails with
//! [`DbError::NotImplemented`]; the composed defaults (execute from query
//! text, batched execution, multiple result sets) are built on the
//! operations the driver does provide.
//!
//! # Example
//! ```ignore
//! use dbinterface::{
//!     Batch, ConnectOptions, Connection, Cursor, Driver, Params, SqlValue, Statement,
//! };
//!
//! let conn = driver.connect(&ConnectOptions::new("app.db")).await?;
//!
//! let mut insert = conn.prepare("INSERT INTO users (id, name) VALUES (?, ?)").await?;
//! insert
//!     .execute_many(&Batch::positional([
//!         vec![SqlValue::from(1), SqlValue::from(2)],
//!         vec![SqlValue::from("Ann"), SqlValue::from("Bob")],
//!     ]))
//!     .await?;
//! insert.close().await?;
//!
//! let mut cursor = conn
//!     .execute("SELECT id, name FROM users WHERE id = ?", &Params::positional([1]))
//!     .await?;
//! for row in cursor.rows() {
//!     let row = row?;
//!     let name = row.get("name")?;
//!     let id = row.get_index(0)?;
//! }
//! ```

pub mod cache;
pub mod config;
pub mod drivers;
pub mod error;
pub mod traits;
pub mod types;

// Re-export main types for convenient access
pub use cache::StatementCache;
pub use config::ConnectOptions;
pub use error::{DbError, Result, Warning};
pub use traits::{Connection, Cursor, CursorOf, Driver, Rows, Statement};
pub use types::{
    Batch, BatchBuilder, BatchRuns, Columns, MemoryCursor, Params, RawQueryResult, Row, SqlValue,
};
