// SQLite module - runs CRUD statements on a rusqlite connection
//
// - params: Parameter conversion between crate and SQLite values
// - query: Result extraction and building
// - executor: CrudExecutor for rusqlite::Connection

pub mod executor;
pub mod params;
pub mod query;

pub use params::{Params, row_value_to_sqlite_value};
pub use query::build_result_set;
