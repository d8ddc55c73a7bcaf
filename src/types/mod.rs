mod params;
mod result;
mod row;
mod sql_value;

pub use params::{Batch, BatchBuilder, BatchRuns, Params};
pub use result::MemoryCursor;
pub use row::{Columns, RawQueryResult, Row};
pub use sql_value::SqlValue;
