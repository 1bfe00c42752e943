use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::SqlCrudError;
use crate::types::RowValues;

/// Object-safe converter between a complex property type and a bindable value.
///
/// Usually implemented through [`ValueHandler`] and [`HandlerRegistry::register`].
pub trait TypeHandler: Send + Sync {
    /// Produce the value bound for a property.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when `value` is not the handled type.
    fn set_value(&self, value: &(dyn Any + Send + Sync)) -> Result<RowValues, SqlCrudError>;

    /// Build the property value from what the executor returned.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConversionError` when `raw` cannot be parsed.
    fn parse(&self, raw: &RowValues) -> Result<Box<dyn Any + Send>, SqlCrudError>;
}

/// Typed converter for one property type `T`.
///
/// ```rust
/// use sql_crud::prelude::*;
///
/// #[derive(Debug, PartialEq)]
/// struct Money(i64);
///
/// struct MoneyHandler;
///
/// impl ValueHandler<Money> for MoneyHandler {
///     fn set_value(&self, value: &Money) -> Result<RowValues, SqlCrudError> {
///         Ok(RowValues::Int(value.0))
///     }
///
///     fn parse(&self, raw: &RowValues) -> Result<Money, SqlCrudError> {
///         Ok(Money(i64::from_sql_value(raw)?))
///     }
/// }
///
/// let mut registry = HandlerRegistry::default();
/// registry.register::<Money, _>("money", MoneyHandler);
/// assert!(registry.contains("money"));
/// ```
pub trait ValueHandler<T>: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns an error when the value cannot be represented as a bindable value.
    fn set_value(&self, value: &T) -> Result<RowValues, SqlCrudError>;

    /// # Errors
    ///
    /// Returns an error when `raw` cannot be parsed into `T`.
    fn parse(&self, raw: &RowValues) -> Result<T, SqlCrudError>;
}

struct Typed<T, H> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T, H> TypeHandler for Typed<T, H>
where
    T: Any + Send + Sync,
    H: ValueHandler<T>,
{
    fn set_value(&self, value: &(dyn Any + Send + Sync)) -> Result<RowValues, SqlCrudError> {
        let typed = value.downcast_ref::<T>().ok_or_else(|| {
            SqlCrudError::ConversionError(format!(
                "type handler for {} received a different type",
                std::any::type_name::<T>()
            ))
        })?;
        self.handler.set_value(typed)
    }

    fn parse(&self, raw: &RowValues) -> Result<Box<dyn Any + Send>, SqlCrudError> {
        let parsed = self.handler.parse(raw)?;
        Ok(Box::new(parsed))
    }
}

/// Type handlers by name, as referenced from [`ColumnType::Custom`](crate::model::ColumnType).
///
/// Filled in while building a [`Crud`](crate::crud::Crud) and read-only afterwards.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn TypeHandler>>,
}

impl HandlerRegistry {
    /// Register a typed handler; a later registration under the same name replaces it.
    pub fn register<T, H>(&mut self, name: &'static str, handler: H)
    where
        T: Any + Send + Sync,
        H: ValueHandler<T>,
    {
        self.register_dyn(
            name,
            Arc::new(Typed {
                handler,
                _marker: PhantomData,
            }),
        );
    }

    pub fn register_dyn(&mut self, name: &'static str, handler: Arc<dyn TypeHandler>) {
        self.handlers.insert(name, handler);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn TypeHandler> {
        self.handlers.get(name).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}
