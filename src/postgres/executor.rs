use async_trait::async_trait;
use tokio_postgres::{Client, GenericClient, NoTls, Transaction};
use tracing::error;

use crate::error::SqlCrudError;
use crate::executor::CrudExecutor;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params as PgParams;
use super::query::build_result_set_from_statement;

/// Connect without TLS and drive the connection on a spawned task.
///
/// # Errors
/// Returns `SqlCrudError::PostgresError` if the connection cannot be established.
pub async fn connect(config: &str) -> Result<Client, SqlCrudError> {
    let (client, connection) = tokio_postgres::connect(config, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "postgres connection closed with an error");
        }
    });
    Ok(client)
}

/// Execute a batch of SQL statements without parameters.
///
/// # Errors
/// Returns errors from batch execution.
pub async fn execute_batch<C>(client: &C, query: &str) -> Result<(), SqlCrudError>
where
    C: GenericClient + Sync,
{
    client.batch_execute(query).await?;
    Ok(())
}

/// Execute a SELECT query with parameters
///
/// # Errors
/// Returns errors from query preparation, execution or result set building.
pub async fn execute_select<C>(
    client: &C,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlCrudError>
where
    C: GenericClient + Sync,
{
    let stmt = client.prepare(query).await?;
    let converted = PgParams::convert(params);
    let rows = client.query(&stmt, converted.as_refs()).await?;
    build_result_set_from_statement(&stmt, &rows)
}

/// Execute a DML query (INSERT, UPDATE, DELETE) with parameters
///
/// # Errors
/// Returns errors from query preparation or execution.
pub async fn execute_dml<C>(
    client: &C,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlCrudError>
where
    C: GenericClient + Sync,
{
    let stmt = client.prepare(query).await?;
    let converted = PgParams::convert(params);
    let rows = client.execute(&stmt, converted.as_refs()).await?;
    usize::try_from(rows).map_err(|e| {
        SqlCrudError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
    })
}

#[async_trait]
impl CrudExecutor for Client {
    async fn execute_batch(&mut self, query: &str) -> Result<(), SqlCrudError> {
        execute_batch(&*self, query).await
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlCrudError> {
        execute_select(&*self, query, params).await
    }

    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlCrudError> {
        execute_dml(&*self, query, params).await
    }
}

/// Statements run inside the transaction; committing or rolling back stays with the caller.
#[async_trait]
impl CrudExecutor for Transaction<'_> {
    async fn execute_batch(&mut self, query: &str) -> Result<(), SqlCrudError> {
        execute_batch(&*self, query).await
    }

    async fn execute_select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlCrudError> {
        execute_select(&*self, query, params).await
    }

    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<usize, SqlCrudError> {
        execute_dml(&*self, query, params).await
    }
}
