use std::any::TypeId;

use tracing::debug;

use crate::cache::{StatementKind, Subject};
use crate::conversion::FromSqlValue;
use crate::error::SqlCrudError;
use crate::executor::CrudExecutor;
use crate::model::Model;
use crate::params::{Conditions, Key};
use crate::query::QueryAndParams;
use crate::results::ResultSet;

use super::Crud;
use super::bind::{key_params, read_rows};

impl Crud {
    /// Fetch one record by key; `None` when no row matches.
    ///
    /// `key` is a raw value for single-column keys or a [`Params`](crate::params::Params) key
    /// object (required for composite keys).
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` when the model has no key or `key` does not supply
    /// every key property, and executor errors unchanged.
    pub async fn get<M, E>(&self, exec: &mut E, key: impl Into<Key>) -> Result<Option<M>, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let params = key_params(&cls, key.into())?;
        let stmt = self.statement(
            &cls,
            Subject::Model(TypeId::of::<M>()),
            StatementKind::Get,
            |b| b.get_by_key(),
        )?;
        let query = QueryAndParams::new(stmt.sql.as_str(), stmt.bind(&params)?);
        let rs = select(exec, &query).await?;
        Ok(read_rows::<M>(&self.inner.handlers, &cls, &rs)?.into_iter().next())
    }

    /// The positional SELECT and values [`Crud::get_list`] would run.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::UnknownProperty` for filter entries that are not properties of `M`
    /// and `SqlCrudError::ParameterError` when a fragment placeholder has no value.
    pub fn list_query<'c, M: Model>(
        &self,
        conditions: impl Into<Conditions<'c>>,
    ) -> Result<QueryAndParams, SqlCrudError> {
        let cls = self.classification::<M>()?;
        let builder = self.builder_for(&cls);
        let clause = builder.where_clause(&conditions.into())?;
        let stmt = self.positional(&builder.list(&clause.sql)?);
        Ok(QueryAndParams::new(stmt.sql.as_str(), stmt.bind(&clause.params)?))
    }

    /// Every record matching `conditions`; see [`Conditions`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Crud::list_query`], and executor errors unchanged.
    pub async fn get_list<'c, M, E>(
        &self,
        exec: &mut E,
        conditions: impl Into<Conditions<'c>>,
    ) -> Result<Vec<M>, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let query = self.list_query::<M>(conditions)?;
        let rs = select(exec, &query).await?;
        read_rows(&self.inner.handlers, &*self.classification::<M>()?, &rs)
    }

    /// The positional SELECT and values [`Crud::get_list_paged`] would run.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::InvalidPaging` for a zero page or page size,
    /// `SqlCrudError::MissingKey` when there is neither an order nor a key, plus the errors of
    /// [`Crud::list_query`].
    pub fn paged_query<'c, M: Model>(
        &self,
        page: u32,
        rows_per_page: u32,
        conditions: impl Into<Conditions<'c>>,
        order_by: Option<&str>,
    ) -> Result<QueryAndParams, SqlCrudError> {
        let cls = self.classification::<M>()?;
        let builder = self.builder_for(&cls);
        let clause = builder.where_clause(&conditions.into())?;
        let stmt = self.positional(&builder.paged(&clause.sql, order_by, page, rows_per_page)?);
        Ok(QueryAndParams::new(stmt.sql.as_str(), stmt.bind(&clause.params)?))
    }

    /// One page (1-based) of the records matching `conditions`.
    ///
    /// `order_by` is used verbatim; without it rows are ordered by the key columns so pages are
    /// stable between calls.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Crud::paged_query`], and executor errors unchanged.
    pub async fn get_list_paged<'c, M, E>(
        &self,
        exec: &mut E,
        page: u32,
        rows_per_page: u32,
        conditions: impl Into<Conditions<'c>>,
        order_by: Option<&str>,
    ) -> Result<Vec<M>, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let query = self.paged_query::<M>(page, rows_per_page, conditions, order_by)?;
        let rs = select(exec, &query).await?;
        read_rows(&self.inner.handlers, &*self.classification::<M>()?, &rs)
    }

    /// The positional `SELECT COUNT(1)` and values [`Crud::record_count`] would run.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Crud::list_query`].
    pub fn count_query<'c, M: Model>(
        &self,
        conditions: impl Into<Conditions<'c>>,
    ) -> Result<QueryAndParams, SqlCrudError> {
        let cls = self.classification::<M>()?;
        let builder = self.builder_for(&cls);
        let clause = builder.where_clause(&conditions.into())?;
        let stmt = self.positional(&builder.count(&clause.sql));
        Ok(QueryAndParams::new(stmt.sql.as_str(), stmt.bind(&clause.params)?))
    }

    /// Number of records matching `conditions`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Crud::count_query`], `SqlCrudError::ConversionError` when the
    /// executor's count is not an integer, and executor errors unchanged.
    pub async fn record_count<'c, M, E>(
        &self,
        exec: &mut E,
        conditions: impl Into<Conditions<'c>>,
    ) -> Result<i64, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let query = self.count_query::<M>(conditions)?;
        debug!(sql = %query.query, params = query.params.len(), "count");
        let count = exec.execute_scalar(&query.query, &query.params).await?;
        if count.is_null() {
            Ok(0)
        } else {
            i64::from_sql_value(&count)
        }
    }
}

async fn select<E: CrudExecutor + ?Sized>(
    exec: &mut E,
    query: &QueryAndParams,
) -> Result<ResultSet, SqlCrudError> {
    debug!(sql = %query.query, params = query.params.len(), "select");
    exec.execute_select(&query.query, &query.params).await
}
