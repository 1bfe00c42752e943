//! The capability a record type implements to be persisted.
//!
//! A [`Model`] describes its properties once, in a `const` slice of [`FieldInfo`], and converts
//! itself to and from rows. Everything else (keys, column lists, statements) is derived from
//! those descriptors by the classifier.

mod field;

use std::any::Any;

pub use field::{ColumnType, FieldInfo};

use crate::conversion::FromSqlValue;
use crate::error::SqlCrudError;
use crate::handlers::HandlerRegistry;
use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Table a model maps to; schema is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableInfo {
    pub name: &'static str,
    pub schema: Option<&'static str>,
}

impl TableInfo {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, schema: None }
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: &'static str) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A property value produced by [`Model::to_row`].
///
/// Plain values are converted up front; `Handled` values are handed to the type handler named by
/// the property's [`ColumnType::Custom`] when the statement is bound.
pub enum FieldValue<'a> {
    Value(RowValues),
    Handled(&'a (dyn Any + Send + Sync)),
}

impl<'a> FieldValue<'a> {
    pub fn handled<T: Any + Send + Sync>(value: &'a T) -> Self {
        FieldValue::Handled(value)
    }
}

impl<T: Into<RowValues>> From<T> for FieldValue<'_> {
    fn from(value: T) -> Self {
        FieldValue::Value(value.into())
    }
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldValue::Handled(_) => f.write_str("Handled(..)"),
        }
    }
}

/// A persisted record type.
///
/// ```rust
/// use sql_crud::prelude::*;
///
/// struct City {
///     name: String,
///     population: i32,
/// }
///
/// impl Model for City {
///     const FIELDS: &'static [FieldInfo] = &[
///         FieldInfo::new("Name", ColumnType::Text).key(),
///         FieldInfo::new("Population", ColumnType::Int32),
///     ];
///
///     fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)> {
///         vec![
///             ("Name", self.name.as_str().into()),
///             ("Population", self.population.into()),
///         ]
///     }
///
///     fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError> {
///         Ok(City {
///             name: row.get("Name")?,
///             population: row.get("Population")?,
///         })
///     }
/// }
///
/// assert_eq!(City::table().name, "City");
/// ```
pub trait Model: Sized + Send + Sync + 'static {
    /// Property descriptors in declaration order.
    const FIELDS: &'static [FieldInfo];

    /// Table the model maps to; defaults to the type's own name.
    fn table() -> TableInfo {
        TableInfo::new(short_type_name(std::any::type_name::<Self>()))
    }

    /// Property name and value for every property the instance carries.
    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)>;

    /// Build an instance from a result row; columns are addressed by property name.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when a column cannot be read as its property type.
    fn from_row(row: &RowReader<'_>) -> Result<Self, SqlCrudError>;
}

/// A narrower record type used to insert or update a subset of a model's properties.
///
/// Property names must be mapped properties of `Target`; anything else is rejected with
/// `SqlCrudError::AmbiguousProjection` before any SQL is produced.
pub trait Projection: Send + Sync + 'static {
    type Target: Model;

    /// Properties of `Target` carried by this projection, in order.
    const PROPERTIES: &'static [&'static str];

    fn to_row(&self) -> Vec<(&'static str, FieldValue<'_>)>;
}

static NULL: RowValues = RowValues::Null;

/// Read access to one result row, keyed by property name.
pub struct RowReader<'a> {
    row: &'a CustomDbRow,
    handlers: &'a HandlerRegistry,
    fields: &'static [FieldInfo],
    model: &'static str,
}

impl<'a> RowReader<'a> {
    pub(crate) fn new(
        row: &'a CustomDbRow,
        handlers: &'a HandlerRegistry,
        fields: &'static [FieldInfo],
        model: &'static str,
    ) -> Self {
        Self {
            row,
            handlers,
            fields,
            model,
        }
    }

    /// Raw value for a property; a column absent from the row reads as `Null`.
    #[must_use]
    pub fn value(&self, property: &str) -> &RowValues {
        self.row.get(property).unwrap_or(&NULL)
    }

    /// Typed value for a property.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` naming the property when conversion fails.
    pub fn get<T: FromSqlValue>(&self, property: &str) -> Result<T, SqlCrudError> {
        T::from_sql_value(self.value(property)).map_err(|e| self.annotate(property, &e))
    }

    /// Typed value, or `T::default()` when the column is absent or NULL.
    ///
    /// Intended for properties that are never selected (ignore-on-select) or stored.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when a present value has the wrong shape.
    pub fn get_or_default<T: FromSqlValue + Default>(
        &self,
        property: &str,
    ) -> Result<T, SqlCrudError> {
        let value = self.value(property);
        if value.is_null() {
            Ok(T::default())
        } else {
            self.get(property)
        }
    }

    /// Value of a [`ColumnType::Custom`] property, parsed by its registered type handler.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConfigError` when the property is not a custom type or no handler
    /// is registered, and `SqlCrudError::ConversionError` when the handler fails or produces a
    /// different type.
    pub fn get_handled<T: Any>(&self, property: &str) -> Result<T, SqlCrudError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == property)
            .ok_or_else(|| SqlCrudError::UnknownProperty {
                model: self.model,
                property: property.to_string(),
            })?;
        let ColumnType::Custom(handler_name) = field.column_type else {
            return Err(SqlCrudError::ConfigError(format!(
                "{}.{property} is not a custom-typed property",
                self.model
            )));
        };
        let handler = self.handlers.get(handler_name).ok_or_else(|| {
            SqlCrudError::ConfigError(format!("no type handler registered as `{handler_name}`"))
        })?;
        let parsed = handler
            .parse(self.value(property))
            .map_err(|e| self.annotate(property, &e))?;
        parsed.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            SqlCrudError::ConversionError(format!(
                "{}.{property}: handler `{handler_name}` produced a different type",
                self.model
            ))
        })
    }

    /// The underlying row, for columns that are not model properties.
    #[must_use]
    pub fn row(&self) -> &CustomDbRow {
        self.row
    }

    fn annotate(&self, property: &str, err: &SqlCrudError) -> SqlCrudError {
        SqlCrudError::ConversionError(format!("{}.{property}: {err}", self.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_drop_paths_and_generics() {
        assert_eq!(short_type_name("app::models::User"), "User");
        assert_eq!(short_type_name("Wrapper<app::User>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn field_values_from_plain_types() {
        assert!(matches!(
            FieldValue::from(5_i32),
            FieldValue::Value(RowValues::Int(5))
        ));
        assert!(matches!(
            FieldValue::from(None::<String>),
            FieldValue::Value(RowValues::Null)
        ));
        let payload = vec![1_u8];
        assert!(matches!(FieldValue::handled(&payload), FieldValue::Handled(_)));
    }
}
