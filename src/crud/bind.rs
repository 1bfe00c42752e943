//! Moving values between records, parameter bags and result rows.

use crate::classify::Classification;
use crate::error::SqlCrudError;
use crate::handlers::HandlerRegistry;
use crate::model::{ColumnType, FieldInfo, FieldValue, Model, RowReader};
use crate::params::{Key, Params};
use crate::results::ResultSet;

/// Named values for a record's `to_row`, running type handlers for handled values.
pub(crate) fn row_params(
    handlers: &HandlerRegistry,
    model: &'static str,
    fields: &'static [FieldInfo],
    row: Vec<(&'static str, FieldValue<'_>)>,
) -> Result<Params, SqlCrudError> {
    let mut params = Params::new();
    for (name, value) in row {
        match value {
            FieldValue::Value(value) => params.set(name, value),
            FieldValue::Handled(value) => {
                let handler_name = match fields.iter().find(|f| f.name == name) {
                    Some(FieldInfo {
                        column_type: ColumnType::Custom(handler_name),
                        ..
                    }) => *handler_name,
                    Some(_) => {
                        return Err(SqlCrudError::ConfigError(format!(
                            "{model}.{name} supplies a handled value but is not a custom-typed property"
                        )));
                    }
                    None => {
                        return Err(SqlCrudError::UnknownProperty {
                            model,
                            property: name.to_string(),
                        });
                    }
                };
                let handler = handlers.get(handler_name).ok_or_else(|| {
                    SqlCrudError::ConfigError(format!(
                        "no type handler registered as `{handler_name}` for {model}.{name}"
                    ))
                })?;
                params.set(name, handler.set_value(value)?);
            }
        }
    }
    Ok(params)
}

/// Build one record per result row.
pub(crate) fn read_rows<M: Model>(
    handlers: &HandlerRegistry,
    classification: &Classification,
    result_set: &ResultSet,
) -> Result<Vec<M>, SqlCrudError> {
    result_set
        .results
        .iter()
        .map(|row| M::from_row(&RowReader::new(row, handlers, M::FIELDS, classification.model)))
        .collect()
}

/// Key values named by the key properties, from a raw key or a key object.
pub(crate) fn key_params(cls: &Classification, key: Key) -> Result<Params, SqlCrudError> {
    let keys = cls.require_keys()?;
    match key {
        Key::Single(value) => match keys {
            [only] => Ok(Params::new().with(only.name, value)),
            _ => Err(SqlCrudError::MissingKey {
                model: cls.model,
                reason: format!(
                    "composite key ({}) needs a key object, not a single value",
                    keys.iter().map(|k| k.name).collect::<Vec<_>>().join(", ")
                ),
            }),
        },
        Key::Named(object) => record_key_params(cls, &object),
    }
}

/// The key values carried by `values`, renamed to the key properties' own names.
pub(crate) fn record_key_params(
    cls: &Classification,
    values: &Params,
) -> Result<Params, SqlCrudError> {
    let mut params = Params::new();
    for key in cls.require_keys()? {
        let value = values.get(key.name).ok_or_else(|| SqlCrudError::MissingKey {
            model: cls.model,
            reason: format!("no value for key property {}", key.name),
        })?;
        params.set(key.name, value.clone());
    }
    Ok(params)
}
