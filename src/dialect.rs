use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlCrudError;
use crate::translation::PlaceholderStyle;

/// The SQL dialect statements are generated for.
///
/// Chosen once when a [`Crud`](crate::crud::Crud) is built and fixed for its lifetime. Parses
/// from config files (serde), the environment (`FromStr`) and the command line (clap):
/// ```rust
/// use sql_crud::prelude::*;
///
/// let dialect: Dialect = "postgres".parse()?;
/// assert_eq!(dialect.quote("Users"), "\"Users\"");
/// # Ok::<(), SqlCrudError>(())
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQL Server: `[x]` identifiers, `ROW_NUMBER()` paging, `SCOPE_IDENTITY()` keys.
    #[default]
    #[serde(alias = "mssql")]
    #[value(name = "sqlserver", alias = "mssql")]
    SqlServer,
    /// `PostgreSQL`: `"x"` identifiers, `LIMIT/OFFSET` paging, `RETURNING` keys, arrays.
    #[serde(alias = "postgresql", alias = "pg")]
    #[value(alias = "postgresql", alias = "pg")]
    Postgres,
    /// `SQLite`: `"x"` identifiers, `LIMIT/OFFSET` paging, `last_insert_rowid()` keys.
    Sqlite,
    /// `MySQL`: `` `x` `` identifiers, `LIMIT offset,count` paging, `LAST_INSERT_ID()` keys.
    #[value(name = "mysql")]
    MySql,
}

/// How a database-generated key is read back after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// `INSERT ... RETURNING key`, run as a scalar query.
    Returning,
    /// A select appended to the insert in the same batch, run as a scalar query.
    SameBatch(&'static str),
    /// A separate scalar query on the same connection after the insert.
    FollowUp(&'static str),
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::SqlServer,
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::MySql,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Dialect::SqlServer => "sqlserver",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
        }
    }

    /// Quote one identifier, doubling any embedded closing quote.
    #[must_use]
    pub fn quote(self, identifier: &str) -> String {
        let (open, close) = match self {
            Dialect::SqlServer => ('[', ']'),
            Dialect::Postgres | Dialect::Sqlite => ('"', '"'),
            Dialect::MySql => ('`', '`'),
        };
        let mut out = String::with_capacity(identifier.len() + 2);
        out.push(open);
        for c in identifier.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }

    /// Quote a table reference, with its schema when there is one.
    #[must_use]
    pub fn quote_table(self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(table)),
            None => self.quote(table),
        }
    }

    #[must_use]
    pub fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            Dialect::SqlServer => PlaceholderStyle::SqlServer,
            Dialect::Postgres => PlaceholderStyle::Postgres,
            Dialect::Sqlite => PlaceholderStyle::Sqlite,
            Dialect::MySql => PlaceholderStyle::MySql,
        }
    }

    #[must_use]
    pub fn identity(self) -> IdentityStrategy {
        match self {
            Dialect::SqlServer => {
                IdentityStrategy::SameBatch("SELECT CAST(SCOPE_IDENTITY() AS BIGINT) AS [id]")
            }
            Dialect::Postgres => IdentityStrategy::Returning,
            Dialect::Sqlite => IdentityStrategy::FollowUp("SELECT last_insert_rowid()"),
            Dialect::MySql => IdentityStrategy::FollowUp("SELECT LAST_INSERT_ID()"),
        }
    }

    /// One-dimensional array columns are only bindable on `PostgreSQL`.
    #[must_use]
    pub fn supports_arrays(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Insert statement for a row where every column takes its default.
    #[must_use]
    pub fn default_values_insert(self, table: &str) -> String {
        match self {
            Dialect::MySql => format!("INSERT INTO {table} () VALUES ()"),
            _ => format!("INSERT INTO {table} DEFAULT VALUES"),
        }
    }

    /// Wrap a select in this dialect's paging shape.
    ///
    /// `page` is 1-based; the result covers rows `(page - 1) * rows + 1` through `page * rows`
    /// under `order_by`. `where_clause` is empty or starts with a space.
    #[must_use]
    pub fn paged_select(
        self,
        columns: &str,
        table: &str,
        where_clause: &str,
        order_by: &str,
        page: u32,
        rows: u32,
    ) -> String {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(rows);
        match self {
            Dialect::SqlServer => {
                let first = offset + 1;
                let last = offset + u64::from(rows);
                format!(
                    "SELECT * FROM (SELECT ROW_NUMBER() OVER(ORDER BY {order_by}) AS PagedNumber, \
                     {columns} FROM {table}{where_clause}) AS u \
                     WHERE PagedNumber BETWEEN {first} AND {last} ORDER BY PagedNumber"
                )
            }
            Dialect::Postgres | Dialect::Sqlite => format!(
                "SELECT {columns} FROM {table}{where_clause} ORDER BY {order_by} \
                 LIMIT {rows} OFFSET {offset}"
            ),
            Dialect::MySql => format!(
                "SELECT {columns} FROM {table}{where_clause} ORDER BY {order_by} \
                 LIMIT {offset},{rows}"
            ),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = SqlCrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" => Ok(Dialect::MySql),
            other => Err(SqlCrudError::ConfigError(format!(
                "unknown dialect `{other}`"
            ))),
        }
    }
}
