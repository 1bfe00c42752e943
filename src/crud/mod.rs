//! The CRUD facade: classification and statements from the cache, values bound from records,
//! execution delegated to a [`CrudExecutor`](crate::executor::CrudExecutor).
//!
//! ```rust,no_run
//! use sql_crud::prelude::*;
//!
//! # struct User { id: i32, name: String }
//! # impl Model for User {
//! #     const FIELDS: &'static [FieldInfo] = &[
//! #         FieldInfo::new("Id", ColumnType::Int32),
//! #         FieldInfo::new("Name", ColumnType::Text),
//! #     ];
//! #     fn table() -> TableInfo { TableInfo::new("Users") }
//! #     fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
//! #         vec![("Id", self.id.into()), ("Name", self.name.as_str().into())]
//! #     }
//! #     fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
//! #         Ok(User { id: row.get("Id")?, name: row.get("Name")? })
//! #     }
//! # }
//! # async fn demo(conn: &mut rusqlite::Connection) -> Result<(), SqlCrudError> {
//! let crud = CrudBuilder::new(Dialect::Sqlite).build();
//! let id: i32 = crud.insert(conn, &User { id: 0, name: "Ann".into() }).await?;
//! let user: Option<User> = crud.get(conn, id).await?;
//! let filter = Params::new().with("Name", "Ann");
//! let matching: Vec<User> = crud.get_list(conn, &filter).await?;
//! # Ok(())
//! # }
//! ```

mod bind;
mod config;
mod read;
mod write;

use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

pub use config::{CrudArgs, CrudBuilder, CrudOptions};

use crate::cache::{CrudCache, StatementKey, StatementKind, Subject};
use crate::classify::{Classification, ProjectionShape, classify, classify_projection, projection_key};
use crate::dialect::Dialect;
use crate::error::SqlCrudError;
use crate::handlers::HandlerRegistry;
use crate::model::{Model, Projection};
use crate::query_builder::SqlBuilder;
use crate::translation::{PositionalSql, to_positional};

struct CrudInner {
    options: CrudOptions,
    handlers: HandlerRegistry,
    cache: CrudCache,
}

/// Entry point for every CRUD operation.
///
/// Cheap to clone; clones share the classification and statement caches. The dialect and type
/// handlers are fixed when the facade is built.
#[derive(Clone)]
pub struct Crud {
    inner: Arc<CrudInner>,
}

impl std::fmt::Debug for Crud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crud")
            .field("options", &self.inner.options)
            .field("handlers", &self.inner.handlers)
            .field("cache", &self.inner.cache)
            .finish()
    }
}

impl Default for Crud {
    fn default() -> Self {
        Self::new(CrudOptions::default())
    }
}

impl Crud {
    #[must_use]
    pub fn new(options: CrudOptions) -> Self {
        Self::with_handlers(options, HandlerRegistry::default())
    }

    #[must_use]
    pub fn with_handlers(options: CrudOptions, handlers: HandlerRegistry) -> Self {
        Self {
            inner: Arc::new(CrudInner {
                options,
                handlers,
                cache: CrudCache::default(),
            }),
        }
    }

    #[must_use]
    pub fn builder(dialect: Dialect) -> CrudBuilder {
        CrudBuilder::new(dialect)
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.inner.options.dialect
    }

    #[must_use]
    pub fn options(&self) -> &CrudOptions {
        &self.inner.options
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    /// Cached classifications, projections and statements, in that order.
    #[must_use]
    pub fn cache_sizes(&self) -> (usize, usize, usize) {
        self.inner.cache.sizes()
    }

    /// The classification of `M`, built on first use.
    ///
    /// # Errors
    ///
    /// Classification itself cannot fail; the `Result` keeps the cache's fallible build path.
    pub fn classification<M: Model>(&self) -> Result<Arc<Classification>, SqlCrudError> {
        self.inner
            .cache
            .classifications
            .get_or_try_insert_with(TypeId::of::<M>(), || {
                let cls = classify::<M>(&self.inner.handlers);
                debug!(
                    model = cls.model,
                    keys = cls.keys.len(),
                    insertable = cls.insertable.len(),
                    updatable = cls.updatable.len(),
                    selectable = cls.selectable.len(),
                    "classified model"
                );
                Ok(cls)
            })
    }

    /// The shape of projection `P` over its target, built on first use.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::AmbiguousProjection` when `P` names a property its target does not
    /// map.
    pub fn projection<P: Projection>(
        &self,
    ) -> Result<(Arc<Classification>, Arc<ProjectionShape>, String), SqlCrudError> {
        let cls = self.classification::<P::Target>()?;
        let key = projection_key::<P>();
        let shape = self
            .inner
            .cache
            .projections
            .get_or_try_insert_with(key.clone(), || {
                let shape = classify_projection::<P>(&cls)?;
                debug!(
                    projection = shape.projection,
                    model = cls.model,
                    properties = shape.properties.len(),
                    "classified projection"
                );
                Ok::<_, SqlCrudError>(shape)
            })?;
        Ok((cls, shape, key))
    }

    /// A fixed-shape statement, synthesized and translated once per dialect.
    fn statement(
        &self,
        cls: &Classification,
        subject: Subject,
        kind: StatementKind,
        build: impl FnOnce(SqlBuilder<'_>) -> Result<String, SqlCrudError>,
    ) -> Result<Arc<PositionalSql>, SqlCrudError> {
        let dialect = self.dialect();
        let key = StatementKey {
            dialect,
            subject,
            kind,
        };
        self.inner.cache.statements.get_or_try_insert_with(key, || {
            let sql = build(SqlBuilder::new(dialect, cls))?;
            debug!(model = cls.model, ?kind, %dialect, sql = %sql, "built statement");
            Ok(to_positional(&sql, dialect.placeholder_style()))
        })
    }

    /// Translate a per-call statement (one that embeds caller conditions).
    fn positional(&self, sql: &str) -> PositionalSql {
        to_positional(sql, self.dialect().placeholder_style())
    }

    fn builder_for<'a>(&self, cls: &'a Classification) -> SqlBuilder<'a> {
        SqlBuilder::new(self.dialect(), cls)
    }
}
