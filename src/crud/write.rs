use std::any::TypeId;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{StatementKind, Subject};
use crate::classify::{Classification, PropertyDescriptor};
use crate::conversion::FromKeyValues;
use crate::dialect::IdentityStrategy;
use crate::error::SqlCrudError;
use crate::executor::CrudExecutor;
use crate::model::{ColumnType, Model, Projection};
use crate::params::{Conditions, Key, Params};
use crate::translation::PositionalSql;
use crate::types::RowValues;

use super::Crud;
use super::bind::{key_params, record_key_params, row_params};

impl Crud {
    /// Insert a record and return its key.
    ///
    /// A single integer key that is zero or NULL is left to the database and read back; a single
    /// UUID key that is nil or NULL is filled with a new time-ordered UUID. Other keys are
    /// inserted as given and returned unchanged. Use `()` as `K` to discard the key.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ParameterError` when the record does not supply an insertable
    /// property, `SqlCrudError::ConversionError` when the key does not fit `K`, and executor
    /// errors unchanged.
    pub async fn insert<M, K, E>(&self, exec: &mut E, record: &M) -> Result<K, SqlCrudError>
    where
        M: Model,
        K: FromKeyValues,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let params = row_params(&self.inner.handlers, cls.model, M::FIELDS, record.to_row())?;
        self.insert_params(
            exec,
            &cls,
            Subject::Model(TypeId::of::<M>()),
            &cls.insertable,
            params,
        )
        .await
    }

    /// Insert only the columns carried by projection `P` (limited-field insert).
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::AmbiguousProjection` when `P` names a property its target does not
    /// map, plus the errors of [`Crud::insert`].
    pub async fn insert_projection<P, K, E>(&self, exec: &mut E, record: &P) -> Result<K, SqlCrudError>
    where
        P: Projection,
        K: FromKeyValues,
        E: CrudExecutor + ?Sized,
    {
        let (cls, shape, key) = self.projection::<P>()?;
        let params = row_params(
            &self.inner.handlers,
            cls.model,
            <P::Target as Model>::FIELDS,
            record.to_row(),
        )?;
        self.insert_params(exec, &cls, Subject::Projection(key), &shape.insertable, params)
            .await
    }

    async fn insert_params<K, E>(
        &self,
        exec: &mut E,
        cls: &Classification,
        subject: Subject,
        insertable: &[PropertyDescriptor],
        mut params: Params,
    ) -> Result<K, SqlCrudError>
    where
        K: FromKeyValues,
        E: CrudExecutor + ?Sized,
    {
        let mut identity: Option<PropertyDescriptor> = None;
        if let [key] = cls.keys.as_slice() {
            let unassigned = params
                .get(key.name)
                .is_none_or(RowValues::is_unassigned_key);
            if key.column_type.is_integer() && (unassigned || !insertable.contains(key)) {
                identity = Some(*key);
            } else if key.column_type == ColumnType::Uuid && unassigned {
                let id = Uuid::now_v7();
                debug!(model = cls.model, key = key.name, %id, "generated key");
                params.set(key.name, id);
            }
        }

        let columns: Vec<PropertyDescriptor> = insertable
            .iter()
            .filter(|p| identity.is_none_or(|k| k.name != p.name))
            .copied()
            .collect();
        let stmt = self.statement(
            cls,
            subject,
            StatementKind::Insert {
                identity: identity.is_some(),
            },
            |b| b.insert(&columns, identity.as_ref()),
        )?;
        let values = stmt.bind(&params)?;
        debug!(model = cls.model, sql = %stmt.sql, params = values.len(), "insert");

        let Some(key) = identity else {
            exec.execute_dml(&stmt.sql, &values).await?;
            let keys = cls
                .keys
                .iter()
                .map(|k| params.get(k.name).cloned().unwrap_or(RowValues::Null))
                .collect();
            return K::from_key_values(keys);
        };

        let generated = match self.dialect().identity() {
            IdentityStrategy::Returning | IdentityStrategy::SameBatch(_) => {
                exec.execute_scalar(&stmt.sql, &values).await?
            }
            IdentityStrategy::FollowUp(select) => {
                exec.execute_dml(&stmt.sql, &values).await?;
                exec.execute_scalar(select, &[]).await?
            }
        };
        debug!(model = cls.model, key = key.name, "read back generated key");
        K::from_key_values(vec![generated])
    }

    /// Update every updatable column of a record, keyed on its own key values.
    ///
    /// Returns the number of affected rows; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` when the model has no key or the record does not carry
    /// its key values, and executor errors unchanged.
    pub async fn update<M, E>(&self, exec: &mut E, record: &M) -> Result<usize, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let params = row_params(&self.inner.handlers, cls.model, M::FIELDS, record.to_row())?;
        record_key_params(&cls, &params)?;
        if cls.updatable.is_empty() {
            debug!(model = cls.model, "no updatable columns");
            return Ok(0);
        }
        let stmt = self.statement(
            &cls,
            Subject::Model(TypeId::of::<M>()),
            StatementKind::Update,
            |b| b.update(&cls.updatable),
        )?;
        dml(exec, &stmt, &params).await
    }

    /// Update only the columns carried by projection `P`; other columns keep their values.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` when `P` does not carry every key property, plus the
    /// errors of [`Crud::update`].
    pub async fn update_projection<P, E>(&self, exec: &mut E, record: &P) -> Result<usize, SqlCrudError>
    where
        P: Projection,
        E: CrudExecutor + ?Sized,
    {
        let (cls, shape, key) = self.projection::<P>()?;
        if let Some(missing) = cls.require_keys()?.iter().find(|k| !shape.carries(k.name)) {
            return Err(SqlCrudError::MissingKey {
                model: cls.model,
                reason: format!(
                    "projection {} does not carry key property {}",
                    shape.projection, missing.name
                ),
            });
        }
        let params = row_params(
            &self.inner.handlers,
            cls.model,
            <P::Target as Model>::FIELDS,
            record.to_row(),
        )?;
        record_key_params(&cls, &params)?;
        if shape.updatable.is_empty() {
            debug!(projection = shape.projection, "no updatable columns");
            return Ok(0);
        }
        let stmt = self.statement(&cls, Subject::Projection(key), StatementKind::Update, |b| {
            b.update(&shape.updatable)
        })?;
        dml(exec, &stmt, &params).await
    }

    /// Delete the row with the given key (raw value or key object).
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` when the key cannot be resolved, and executor errors
    /// unchanged.
    pub async fn delete<M, E>(&self, exec: &mut E, key: impl Into<Key>) -> Result<usize, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let params = key_params(&cls, key.into())?;
        self.delete_by_key::<M, E>(exec, &cls, &params).await
    }

    /// Delete the row of a record, using the record's key values.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` when the record does not carry its key values, and
    /// executor errors unchanged.
    pub async fn delete_record<M, E>(&self, exec: &mut E, record: &M) -> Result<usize, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let values = row_params(&self.inner.handlers, cls.model, M::FIELDS, record.to_row())?;
        let params = record_key_params(&cls, &values)?;
        self.delete_by_key::<M, E>(exec, &cls, &params).await
    }

    async fn delete_by_key<M, E>(
        &self,
        exec: &mut E,
        cls: &Classification,
        params: &Params,
    ) -> Result<usize, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let stmt = self.statement(
            cls,
            Subject::Model(TypeId::of::<M>()),
            StatementKind::DeleteByKey,
            |b| b.delete_by_key(),
        )?;
        dml(exec, &stmt, params).await
    }

    /// Delete every row matching `conditions`.
    ///
    /// With [`Conditions::All`], an empty filter or a blank fragment this deletes **every row in
    /// the table**. A warning is logged in that case unless
    /// [`CrudOptions::warn_on_unfiltered_delete`](super::CrudOptions) is off.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Crud::get_list`].
    pub async fn delete_list<'c, M, E>(
        &self,
        exec: &mut E,
        conditions: impl Into<Conditions<'c>>,
    ) -> Result<usize, SqlCrudError>
    where
        M: Model,
        E: CrudExecutor + ?Sized,
    {
        let cls = self.classification::<M>()?;
        let conditions = conditions.into();
        if conditions.is_unfiltered() && self.inner.options.warn_on_unfiltered_delete {
            warn!(
                model = cls.model,
                table = cls.table.name,
                "delete_list without conditions removes every row"
            );
        }
        let builder = self.builder_for(&cls);
        let clause = builder.where_clause(&conditions)?;
        let stmt = self.positional(&builder.delete_where(&clause.sql));
        dml(exec, &stmt, &clause.params).await
    }
}

async fn dml<E: CrudExecutor + ?Sized>(
    exec: &mut E,
    stmt: &PositionalSql,
    params: &Params,
) -> Result<usize, SqlCrudError> {
    let values = stmt.bind(params)?;
    debug!(sql = %stmt.sql, params = values.len(), "execute");
    exec.execute_dml(&stmt.sql, &values).await
}
