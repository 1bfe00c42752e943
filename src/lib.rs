//! Metadata-driven CRUD statements for SQL Server, `PostgreSQL`, `SQLite` and `MySQL` dialects.
//!
//! Record types implement [`Model`](model::Model) to describe their properties; the
//! [`Crud`](crud::Crud) facade classifies them once, synthesizes and caches the SQL, binds
//! values and runs the statements through any [`CrudExecutor`](executor::CrudExecutor).

pub mod cache;
pub mod classify;
pub mod conversion;
pub mod crud;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod model;
pub mod params;
pub mod prelude;
pub mod query;
pub mod query_builder;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use crud::{Crud, CrudArgs, CrudBuilder, CrudOptions};
pub use dialect::Dialect;
pub use error::SqlCrudError;
pub use executor::CrudExecutor;
pub use model::{Model, Projection};
