use async_trait::async_trait;

use crate::config::ConnectOptions;
use crate::error::{DbError, Result};
use crate::traits::Connection;

/// Entry point implemented by every database driver.
/// Drivers are responsible for:
/// - Connecting to the target system named in [`ConnectOptions`]
/// - Converting `SqlValue` parameters to native types
/// - Producing cursors whose rows expose values by name and by position
#[async_trait]
pub trait Driver: Send + Sync {
    type Connection: Connection;

    async fn connect(&self, _options: &ConnectOptions) -> Result<Self::Connection> {
        Err(DbError::not_implemented("connect"))
    }
}
