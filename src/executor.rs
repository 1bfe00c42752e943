use async_trait::async_trait;

use crate::error::SqlCrudError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// The statement executor the CRUD facade runs against.
///
/// Statements arrive already translated to the executor's positional placeholder style, with
/// parameters in placeholder order. Implementations exist for `rusqlite::Connection` and for
/// `tokio_postgres` clients and transactions; anything else (a pool connection, a recorder in
/// tests) only needs these three calls.
#[async_trait]
pub trait CrudExecutor: Send {
    /// Executes a batch of SQL statements without parameters.
    async fn execute_batch(&mut self, query: &str) -> Result<(), SqlCrudError>;

    /// Executes a single SELECT statement and returns the result set.
    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlCrudError>;

    /// Executes a single DML statement and returns the number of rows affected.
    async fn execute_dml(&mut self, query: &str, params: &[RowValues])
    -> Result<usize, SqlCrudError>;

    /// First column of the first row, or `Null` when the query returns no rows.
    async fn execute_scalar(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<RowValues, SqlCrudError> {
        Ok(self.execute_select(query, params).await?.first_value())
    }
}
