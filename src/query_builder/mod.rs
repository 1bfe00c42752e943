//! Pure SQL synthesis from a classification and a dialect.
//!
//! Every statement uses `@Property` placeholders; the facade rewrites them into the dialect's
//! positional style when binding. Only caller fragments (where clauses, order-by lists) are
//! copied into the text verbatim.

use crate::classify::{Classification, PropertyDescriptor};
use crate::dialect::Dialect;
use crate::error::SqlCrudError;
use crate::model::ColumnType;
use crate::params::{Conditions, Params};
use crate::types::RowValues;

mod dml;
mod select;

/// Builds the statements for one classified model under one dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlBuilder<'a> {
    pub(crate) dialect: Dialect,
    pub(crate) classification: &'a Classification,
}

/// A where clause (empty or starting with a space) and the parameters it references.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Params,
}

impl<'a> SqlBuilder<'a> {
    #[must_use]
    pub fn new(dialect: Dialect, classification: &'a Classification) -> Self {
        Self {
            dialect,
            classification,
        }
    }

    pub(crate) fn table(&self) -> String {
        let table = &self.classification.table;
        self.dialect.quote_table(table.schema, table.name)
    }

    pub(crate) fn column(&self, property: &PropertyDescriptor) -> String {
        self.dialect.quote(property.column)
    }

    /// Reject array columns outside `PostgreSQL`.
    pub(crate) fn check_supported(
        &self,
        properties: &[PropertyDescriptor],
    ) -> Result<(), SqlCrudError> {
        if self.dialect.supports_arrays() {
            return Ok(());
        }
        match properties.iter().find(|p| p.column_type.is_simple_array()) {
            Some(p) => Err(SqlCrudError::UnsupportedDialectFeature {
                dialect: self.dialect,
                feature: format!(
                    "array column {}.{}",
                    self.classification.model, p.name
                ),
            }),
            None => Ok(()),
        }
    }

    /// `col = @Prop AND ...` over the key columns.
    pub(crate) fn key_predicate(&self) -> Result<String, SqlCrudError> {
        let keys = self.classification.require_keys()?;
        Ok(keys
            .iter()
            .map(|k| format!("{} = @{}", self.column(k), k.name))
            .collect::<Vec<_>>()
            .join(" AND "))
    }

    /// Where clause derived from a filter object.
    ///
    /// Entries are resolved to model properties (case-insensitively) and re-keyed to the
    /// property's own name; null entries become `IS NULL`.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::UnknownProperty` for entries that name no mapped property and
    /// `SqlCrudError::ParameterError` for array or object values.
    pub fn filter_clause(&self, filter: &Params) -> Result<WhereClause, SqlCrudError> {
        let mut predicates = Vec::with_capacity(filter.len());
        let mut params = Params::new();
        for (name, value) in filter.iter() {
            let property = self.classification.property(name).ok_or_else(|| {
                SqlCrudError::UnknownProperty {
                    model: self.classification.model,
                    property: name.to_string(),
                }
            })?;
            self.check_supported(std::slice::from_ref(property))?;
            let composite = match value {
                RowValues::Array(_) => true,
                RowValues::JSON(_) => property.column_type != ColumnType::Json,
                _ => false,
            };
            if composite {
                return Err(SqlCrudError::ParameterError(format!(
                    "filter on {}.{} needs a simple value, found {}",
                    self.classification.model,
                    property.name,
                    value.kind()
                )));
            }
            if value.is_null() {
                predicates.push(format!("{} IS NULL", self.column(property)));
            } else {
                predicates.push(format!("{} = @{}", self.column(property), property.name));
                params.set(property.name, value.clone());
            }
        }
        let sql = if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        };
        Ok(WhereClause { sql, params })
    }

    /// Where clause for any [`Conditions`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SqlBuilder::filter_clause`].
    pub fn where_clause(&self, conditions: &Conditions<'_>) -> Result<WhereClause, SqlCrudError> {
        match conditions {
            Conditions::All => Ok(WhereClause {
                sql: String::new(),
                params: Params::new(),
            }),
            Conditions::Filter(filter) => self.filter_clause(filter),
            Conditions::Sql { fragment, params } => {
                let fragment = fragment.trim();
                Ok(WhereClause {
                    sql: if fragment.is_empty() {
                        String::new()
                    } else {
                        format!(" {fragment}")
                    },
                    params: (*params).clone(),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::classify::{Classification, classify};
    use crate::error::SqlCrudError;
    use crate::handlers::HandlerRegistry;
    use crate::model::{ColumnType, FieldInfo, FieldValue, Model, RowReader, TableInfo};

    pub struct User;

    impl Model for User {
        const FIELDS: &'static [FieldInfo] = &[
            FieldInfo::new("Id", ColumnType::Int32),
            FieldInfo::new("Name", ColumnType::Text),
            FieldInfo::new("Age", ColumnType::Int32),
            FieldInfo::new("CreatedDate", ColumnType::DateTime).read_only(),
        ];

        fn table() -> TableInfo {
            TableInfo::new("Users")
        }

        fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
            Vec::new()
        }

        fn from_row(_row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
            Ok(User)
        }
    }

    pub struct CarLog;

    impl Model for CarLog {
        const FIELDS: &'static [FieldInfo] = &[
            FieldInfo::new("Id", ColumnType::Int32).key().column("LogId"),
            FieldInfo::new("LogNotes", ColumnType::Text),
            FieldInfo::new("Scores", ColumnType::Array(&ColumnType::Int32)),
        ];

        fn table() -> TableInfo {
            TableInfo::new("CarLog").with_schema("Log")
        }

        fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
            Vec::new()
        }

        fn from_row(_row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
            Ok(CarLog)
        }
    }

    pub fn user() -> Classification {
        classify::<User>(&HandlerRegistry::default())
    }

    pub fn car_log() -> Classification {
        classify::<CarLog>(&HandlerRegistry::default())
    }
}
