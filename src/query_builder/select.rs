use crate::error::SqlCrudError;

use super::SqlBuilder;

impl SqlBuilder<'_> {
    /// Selectable columns, aliased to the property name where the column name differs.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::UnsupportedDialectFeature` for array columns outside `PostgreSQL`.
    pub fn select_list(&self) -> Result<String, SqlCrudError> {
        let selectable = &self.classification.selectable;
        self.check_supported(selectable)?;
        if selectable.is_empty() {
            return Ok("*".to_string());
        }
        Ok(selectable
            .iter()
            .map(|p| {
                if p.has_explicit_column() {
                    format!("{} AS {}", self.column(p), self.dialect.quote(p.name))
                } else {
                    self.column(p)
                }
            })
            .collect::<Vec<_>>()
            .join(", "))
    }

    /// `SELECT .. WHERE key = @Key`.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::MissingKey` for keyless models.
    pub fn get_by_key(&self) -> Result<String, SqlCrudError> {
        let predicate = self.key_predicate()?;
        Ok(format!(
            "SELECT {} FROM {} WHERE {predicate}",
            self.select_list()?,
            self.table()
        ))
    }

    /// `SELECT ..` with an optional where clause (empty or starting with a space).
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::UnsupportedDialectFeature` for array columns outside `PostgreSQL`.
    pub fn list(&self, where_sql: &str) -> Result<String, SqlCrudError> {
        Ok(format!(
            "SELECT {} FROM {}{where_sql}",
            self.select_list()?,
            self.table()
        ))
    }

    /// One page of a list, 1-based.
    ///
    /// Without `order_by` the key columns give the order, so pages stay stable across calls.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::InvalidPaging` for a zero page or page size and
    /// `SqlCrudError::MissingKey` when no order is given for a keyless model.
    pub fn paged(
        &self,
        where_sql: &str,
        order_by: Option<&str>,
        page: u32,
        rows_per_page: u32,
    ) -> Result<String, SqlCrudError> {
        if page == 0 || rows_per_page == 0 {
            return Err(SqlCrudError::InvalidPaging(format!(
                "page {page} with {rows_per_page} rows per page; both start at 1"
            )));
        }
        let order_by = match order_by.map(str::trim).filter(|o| !o.is_empty()) {
            Some(order_by) => order_by.to_string(),
            None => self
                .classification
                .require_keys()?
                .iter()
                .map(|k| self.column(k))
                .collect::<Vec<_>>()
                .join(", "),
        };
        Ok(self.dialect.paged_select(
            &self.select_list()?,
            &self.table(),
            where_sql,
            &order_by,
            page,
            rows_per_page,
        ))
    }

    #[must_use]
    pub fn count(&self, where_sql: &str) -> String {
        format!("SELECT COUNT(1) FROM {}{where_sql}", self.table())
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::Dialect;
    use crate::error::SqlCrudError;
    use crate::query_builder::{SqlBuilder, fixtures};

    #[test]
    fn get_by_key_per_dialect() {
        let cls = fixtures::user();
        assert_eq!(
            SqlBuilder::new(Dialect::SqlServer, &cls).get_by_key().unwrap(),
            "SELECT [Id], [Name], [Age], [CreatedDate] FROM [Users] WHERE [Id] = @Id"
        );
        assert_eq!(
            SqlBuilder::new(Dialect::MySql, &cls).get_by_key().unwrap(),
            "SELECT `Id`, `Name`, `Age`, `CreatedDate` FROM `Users` WHERE `Id` = @Id"
        );
    }

    #[test]
    fn explicit_columns_are_aliased_and_schema_quoted() {
        let cls = fixtures::car_log();
        assert_eq!(
            SqlBuilder::new(Dialect::Postgres, &cls).get_by_key().unwrap(),
            "SELECT \"LogId\" AS \"Id\", \"LogNotes\", \"Scores\" FROM \"Log\".\"CarLog\" \
             WHERE \"LogId\" = @Id"
        );
        let err = SqlBuilder::new(Dialect::Sqlite, &cls).list("").unwrap_err();
        assert!(matches!(err, SqlCrudError::UnsupportedDialectFeature { .. }));
    }

    #[test]
    fn paging_defaults_to_key_order() {
        let cls = fixtures::user();
        let sql = SqlBuilder::new(Dialect::Sqlite, &cls)
            .paged("", None, 2, 10)
            .unwrap();
        assert!(sql.ends_with("FROM \"Users\" ORDER BY \"Id\" LIMIT 10 OFFSET 10"));

        let sql = SqlBuilder::new(Dialect::Sqlite, &cls)
            .paged(" WHERE \"Age\" > 3", Some("Age desc"), 1, 5)
            .unwrap();
        assert!(sql.ends_with("WHERE \"Age\" > 3 ORDER BY Age desc LIMIT 5 OFFSET 0"));
    }

    #[test]
    fn zero_page_is_invalid() {
        let cls = fixtures::user();
        let builder = SqlBuilder::new(Dialect::Postgres, &cls);
        assert!(matches!(
            builder.paged("", None, 0, 10),
            Err(SqlCrudError::InvalidPaging(_))
        ));
        assert!(matches!(
            builder.paged("", None, 1, 0),
            Err(SqlCrudError::InvalidPaging(_))
        ));
    }

    #[test]
    fn count_shares_the_where_clause() {
        let cls = fixtures::user();
        assert_eq!(
            SqlBuilder::new(Dialect::Postgres, &cls).count(" WHERE \"Age\" = @Age"),
            "SELECT COUNT(1) FROM \"Users\" WHERE \"Age\" = @Age"
        );
    }
}
