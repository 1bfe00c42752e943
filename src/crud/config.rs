use std::any::Any;
use std::sync::Arc;

use clap::Args;
use serde::Deserialize;

use crate::dialect::Dialect;
use crate::error::SqlCrudError;
use crate::handlers::{HandlerRegistry, TypeHandler, ValueHandler};

use super::Crud;

fn default_true() -> bool {
    true
}

/// Options fixed for the lifetime of a [`Crud`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrudOptions {
    pub dialect: Dialect,
    /// Log a warning when `delete_list` runs without any condition (every row is removed).
    #[serde(default = "default_true")]
    pub warn_on_unfiltered_delete: bool,
}

impl Default for CrudOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            warn_on_unfiltered_delete: true,
        }
    }
}

impl CrudOptions {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unfiltered_delete_warning(mut self, warn: bool) -> Self {
        self.warn_on_unfiltered_delete = warn;
        self
    }

    /// Parse options from a JSON document such as `{"dialect": "postgres"}`.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConfigError` for malformed JSON or an unknown dialect.
    pub fn from_json(text: &str) -> Result<Self, SqlCrudError> {
        serde_json::from_str(text)
            .map_err(|e| SqlCrudError::ConfigError(format!("invalid crud options: {e}")))
    }
}

/// Command-line flags for the options, meant to be `#[command(flatten)]`ed into an application's
/// own clap parser.
#[derive(Debug, Clone, Args)]
pub struct CrudArgs {
    /// SQL dialect to generate
    #[arg(long, value_enum, default_value_t = Dialect::SqlServer)]
    pub dialect: Dialect,

    /// Do not warn when a delete-list call has no conditions
    #[arg(long)]
    pub quiet_unfiltered_delete: bool,
}

impl CrudArgs {
    #[must_use]
    pub fn into_options(self) -> CrudOptions {
        CrudOptions::new(self.dialect).with_unfiltered_delete_warning(!self.quiet_unfiltered_delete)
    }
}

/// Fluent builder for [`Crud`].
#[derive(Debug, Clone, Default)]
pub struct CrudBuilder {
    opts: CrudOptions,
    handlers: HandlerRegistry,
}

impl CrudBuilder {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            opts: CrudOptions::new(dialect),
            handlers: HandlerRegistry::default(),
        }
    }

    #[must_use]
    pub fn options(mut self, opts: CrudOptions) -> Self {
        self.opts = opts;
        self
    }

    #[must_use]
    pub fn warn_on_unfiltered_delete(mut self, warn: bool) -> Self {
        self.opts.warn_on_unfiltered_delete = warn;
        self
    }

    /// Register a type handler under the name used by `ColumnType::Custom`.
    #[must_use]
    pub fn handler<T, H>(mut self, name: &'static str, handler: H) -> Self
    where
        T: Any + Send + Sync,
        H: ValueHandler<T>,
    {
        self.handlers.register::<T, H>(name, handler);
        self
    }

    #[must_use]
    pub fn handler_dyn(mut self, name: &'static str, handler: Arc<dyn TypeHandler>) -> Self {
        self.handlers.register_dyn(name, handler);
        self
    }

    #[must_use]
    pub fn finish(self) -> (CrudOptions, HandlerRegistry) {
        (self.opts, self.handlers)
    }

    #[must_use]
    pub fn build(self) -> Crud {
        let (opts, handlers) = self.finish();
        Crud::with_handlers(opts, handlers)
    }
}
