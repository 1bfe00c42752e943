use async_trait::async_trait;
use rusqlite::Connection;

use crate::error::SqlCrudError;
use crate::executor::CrudExecutor;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set;

/// Statements run synchronously on the calling task; prepared statements are cached on the
/// connection.
///
/// `rusqlite::Transaction` is not `Send`, so transactions are driven with
/// `execute_batch("BEGIN")` / `execute_batch("COMMIT")` on the connection itself.
#[async_trait]
impl CrudExecutor for Connection {
    async fn execute_batch(&mut self, query: &str) -> Result<(), SqlCrudError> {
        Connection::execute_batch(self, query)?;
        Ok(())
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlCrudError> {
        let converted = Params::convert(params)?;
        let mut stmt = self.prepare_cached(query)?;
        build_result_set(&mut stmt, converted.as_values())
    }

    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlCrudError> {
        let converted = Params::convert(params)?;
        let mut stmt = self.prepare_cached(query)?;
        Ok(stmt.execute(&converted.as_refs()[..])?)
    }
}
