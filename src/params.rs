//! Caller-supplied parameter bags, filter conditions and key values.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::SqlCrudError;
use crate::model::{FieldValue, Model};
use crate::types::RowValues;

/// An ordered bag of named values.
///
/// Used as a filter object (`column = @property` per entry), as the parameters of a caller's
/// where fragment, and as a key object for composite keys. Names are matched exactly first and
/// then ignoring ASCII case:
/// ```rust
/// use sql_crud::prelude::*;
///
/// let filter = Params::new().with("Age", 10).with_null("ScheduledDayOff");
/// assert_eq!(filter.get("age"), Some(&RowValues::Int(10)));
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, RowValues)>,
}

impl Params {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a value; a value already stored under the same name is replaced.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn with_null(self, name: impl Into<String>) -> Self {
        self.with(name, RowValues::Null)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<RowValues>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Build from a JSON object; each member becomes one entry.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ParameterError` when `value` is not an object.
    pub fn from_json(value: JsonValue) -> Result<Self, SqlCrudError> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                entries: map
                    .into_iter()
                    .map(|(name, value)| (name, json_to_row_value(value)))
                    .collect(),
            }),
            JsonValue::Null => Ok(Self::new()),
            other => Err(SqlCrudError::ParameterError(format!(
                "parameters must be a JSON object, got {other}"
            ))),
        }
    }

    /// Build from any serializable struct or map, the way an anonymous filter object would be.
    ///
    /// ```rust
    /// use sql_crud::prelude::*;
    ///
    /// #[derive(serde::Serialize)]
    /// struct ByAge {
    ///     #[serde(rename = "Age")]
    ///     age: i32,
    /// }
    ///
    /// let params = Params::from_serialize(&ByAge { age: 10 })?;
    /// assert_eq!(params.get("Age"), Some(&RowValues::Int(10)));
    /// # Ok::<(), SqlCrudError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ParameterError` when serialization fails or does not produce an
    /// object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, SqlCrudError> {
        let json = serde_json::to_value(value)
            .map_err(|e| SqlCrudError::ParameterError(format!("cannot serialize filter: {e}")))?;
        Self::from_json(json)
    }

    /// The plain property values of a record, e.g. as a key object for its own row.
    ///
    /// Values that need a type handler are skipped.
    #[must_use]
    pub fn from_model<M: Model>(record: &M) -> Self {
        record
            .to_row()
            .into_iter()
            .filter_map(|(name, value)| match value {
                FieldValue::Value(value) => Some((name, value)),
                FieldValue::Handled(_) => None,
            })
            .collect()
    }
}

impl<N: Into<String>, V: Into<RowValues>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

fn json_to_row_value(value: JsonValue) -> RowValues {
    match value {
        JsonValue::Null => RowValues::Null,
        JsonValue::Bool(b) => RowValues::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => RowValues::Int(i),
            None => n.as_f64().map_or(RowValues::Null, RowValues::Float),
        },
        JsonValue::String(s) => RowValues::Text(s),
        JsonValue::Array(items) => {
            RowValues::Array(items.into_iter().map(json_to_row_value).collect())
        }
        object @ JsonValue::Object(_) => RowValues::JSON(object),
    }
}

static NO_PARAMS: Params = Params::new();

/// Which rows a list, count or delete-list operation applies to.
#[derive(Debug, Clone, Copy)]
pub enum Conditions<'a> {
    /// No where clause. For delete-list this removes every row in the table.
    All,
    /// `column = @property` for each entry, `column IS NULL` for null entries. An empty filter
    /// behaves like `All`.
    Filter(&'a Params),
    /// A fragment used verbatim (include the `WHERE` keyword), with its own parameters.
    Sql {
        fragment: &'a str,
        params: &'a Params,
    },
}

impl<'a> Conditions<'a> {
    #[must_use]
    pub fn sql(fragment: &'a str, params: &'a Params) -> Self {
        Conditions::Sql { fragment, params }
    }

    /// A fragment without parameters.
    #[must_use]
    pub fn raw(fragment: &'a str) -> Self {
        Conditions::Sql {
            fragment,
            params: &NO_PARAMS,
        }
    }

    /// True when no where clause will be generated.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        match self {
            Conditions::All => true,
            Conditions::Filter(params) => params.is_empty(),
            Conditions::Sql { fragment, .. } => fragment.trim().is_empty(),
        }
    }
}

impl<'a> From<&'a Params> for Conditions<'a> {
    fn from(params: &'a Params) -> Self {
        Conditions::Filter(params)
    }
}

/// Key input for get and delete: a single raw value or a named key object.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Single(RowValues),
    Named(Params),
}

macro_rules! impl_single_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Single(RowValues::from(value))
                }
            }
        )*
    };
}

impl_single_key!(i16, i32, i64, u32, String, &str, uuid::Uuid, RowValues);

impl From<Params> for Key {
    fn from(params: Params) -> Self {
        Key::Named(params)
    }
}

impl From<&Params> for Key {
    fn from(params: &Params) -> Self {
        Key::Named(params.clone())
    }
}
