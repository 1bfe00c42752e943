// PostgreSQL module - runs CRUD statements on tokio-postgres clients and transactions
//
// - params: Parameter conversion between crate and PostgreSQL types
// - query: Result extraction and building
// - executor: CrudExecutor for Client and Transaction, plus a connect helper

pub mod executor;
pub mod params;
pub mod query;

pub use executor::connect;
pub use params::Params;
pub use query::{build_result_set_from_statement, postgres_extract_value};
