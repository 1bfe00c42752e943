use crate::classify::PropertyDescriptor;
use crate::dialect::IdentityStrategy;
use crate::error::SqlCrudError;

use super::SqlBuilder;

impl SqlBuilder<'_> {
    /// `INSERT` of `columns`; with `identity` the dialect's key readback is attached where it
    /// belongs in the same statement (`RETURNING` or a same-batch select).
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::UnsupportedDialectFeature` for array columns outside `PostgreSQL`.
    pub fn insert(
        &self,
        columns: &[PropertyDescriptor],
        identity: Option<&PropertyDescriptor>,
    ) -> Result<String, SqlCrudError> {
        self.check_supported(columns)?;
        let table = self.table();
        let mut sql = if columns.is_empty() {
            self.dialect.default_values_insert(&table)
        } else {
            let names = columns
                .iter()
                .map(|p| self.column(p))
                .collect::<Vec<_>>()
                .join(", ");
            let values = columns
                .iter()
                .map(|p| format!("@{}", p.name))
                .collect::<Vec<_>>()
                .join(", ");
            format!("INSERT INTO {table} ({names}) VALUES ({values})")
        };
        if let Some(key) = identity {
            match self.dialect.identity() {
                IdentityStrategy::Returning => {
                    sql.push_str(" RETURNING ");
                    sql.push_str(&self.column(key));
                }
                IdentityStrategy::SameBatch(select) => {
                    sql.push_str("; ");
                    sql.push_str(select);
                }
                IdentityStrategy::FollowUp(_) => {}
            }
        }
        Ok(sql)
    }

    /// `UPDATE .. SET` for `set` (never empty), keyed on the key columns.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` for keyless models.
    pub fn update(&self, set: &[PropertyDescriptor]) -> Result<String, SqlCrudError> {
        self.check_supported(set)?;
        let predicate = self.key_predicate()?;
        let assignments = set
            .iter()
            .map(|p| format!("{} = @{}", self.column(p), p.name))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "UPDATE {} SET {assignments} WHERE {predicate}",
            self.table()
        ))
    }

    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` for keyless models.
    pub fn delete_by_key(&self) -> Result<String, SqlCrudError> {
        let predicate = self.key_predicate()?;
        Ok(format!("DELETE FROM {} WHERE {predicate}", self.table()))
    }

    /// `DELETE` with an optional where clause; an empty clause deletes every row.
    #[must_use]
    pub fn delete_where(&self, where_sql: &str) -> String {
        format!("DELETE FROM {}{where_sql}", self.table())
    }
}
