//! Convenient imports for common functionality.
//!
//! This module re-exports the types a model definition and a typical call site need.

pub use crate::conversion::{FromKeyValues, FromSqlValue};
pub use crate::crud::{Crud, CrudArgs, CrudBuilder, CrudOptions};
pub use crate::dialect::Dialect;
pub use crate::error::SqlCrudError;
pub use crate::executor::CrudExecutor;
pub use crate::handlers::{HandlerRegistry, TypeHandler, ValueHandler};
pub use crate::model::{ColumnType, FieldInfo, FieldValue, Model, Projection, RowReader, TableInfo};
pub use crate::params::{Conditions, Key, Params};
pub use crate::query::QueryAndParams;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::RowValues;
