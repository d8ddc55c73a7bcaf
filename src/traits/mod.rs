mod connection;
mod cursor;
mod driver;
mod statement;

pub use connection::{Connection, CursorOf};
pub use cursor::{Cursor, Rows};
pub use driver::Driver;
pub use statement::Statement;
