use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;
#[cfg(feature = "postgres")]
use tokio_postgres;

use crate::dialect::Dialect;

#[derive(Debug, Error)]
pub enum SqlCrudError {
    /// The model (or the supplied input) does not resolve to a primary key.
    #[error("Missing key for {model}: {reason}")]
    MissingKey { model: &'static str, reason: String },

    /// A limited-field projection names a property the model does not map.
    #[error("Projection {projection} references `{property}`, which is not a mapped property of {model}")]
    AmbiguousProjection {
        projection: &'static str,
        model: &'static str,
        property: String,
    },

    #[error("{feature} is not supported by the {dialect} dialect")]
    UnsupportedDialectFeature {
        dialect: Dialect,
        feature: String,
    },

    /// A filter or key object names a property the model does not have.
    #[error("{model} has no property named `{property}`")]
    UnknownProperty { model: &'static str, property: String },

    #[error("Invalid paging request: {0}")]
    InvalidPaging(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlCrudError {
    /// True when the error came from the executor rather than from classification or synthesis.
    #[must_use]
    pub fn is_executor_error(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            SqlCrudError::PostgresError(_) => true,
            #[cfg(feature = "sqlite")]
            SqlCrudError::SqliteError(_) => true,
            SqlCrudError::ExecutionError(_) => true,
            _ => false,
        }
    }
}
