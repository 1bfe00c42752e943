//! Rewrite `@name` placeholders into a dialect's positional parameter style.
//!
//! Generated statements and caller fragments are both written with named placeholders; the
//! driver only understands positions. The rewrite returns the positional SQL together with the
//! parameter name that belongs in each position.

mod parsers;
mod scanner;

use parsers::{
    closes_dollar_quote, is_block_comment_end, is_block_comment_start, is_line_comment_start,
    try_start_dollar_quote,
};
use scanner::{State, is_identifier_byte, scan_identifier};

use crate::error::SqlCrudError;
use crate::params::Params;
use crate::types::RowValues;

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
    /// SQL Server placeholders like `@P1`; `[x]` is a quoted identifier.
    SqlServer,
    /// Bare `?`, one per occurrence.
    MySql,
}

impl PlaceholderStyle {
    fn numbered(self) -> bool {
        !matches!(self, PlaceholderStyle::MySql)
    }

    fn push_placeholder(self, buf: &mut String, position: usize) {
        match self {
            PlaceholderStyle::Postgres => {
                buf.push('$');
                buf.push_str(&position.to_string());
            }
            PlaceholderStyle::Sqlite => {
                buf.push('?');
                buf.push_str(&position.to_string());
            }
            PlaceholderStyle::SqlServer => {
                buf.push_str("@P");
                buf.push_str(&position.to_string());
            }
            PlaceholderStyle::MySql => buf.push('?'),
        }
    }
}

/// SQL with positional placeholders and the parameter name for each position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalSql {
    pub sql: String,
    pub names: Vec<String>,
}

impl PositionalSql {
    /// Pull the value for every position out of `params`.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ParameterError` when a placeholder has no value.
    pub fn bind(&self, params: &Params) -> Result<Vec<RowValues>, SqlCrudError> {
        self.names
            .iter()
            .map(|name| {
                params.get(name).cloned().ok_or_else(|| {
                    SqlCrudError::ParameterError(format!("no value supplied for @{name}"))
                })
            })
            .collect()
    }
}

/// Rewrite every `@name` outside quotes and comments into `style`.
///
/// Numbered styles reuse one position for repeated names; `MySql` emits a `?` per occurrence.
/// `@@name` system variables, `@` inside identifiers (`a@b`) and operators such as `@>` are left
/// alone:
/// ```rust
/// use sql_crud::translation::{PlaceholderStyle, to_positional};
///
/// let out = to_positional("select * from t where a = @A and b = '@B'", PlaceholderStyle::Postgres);
/// assert_eq!(out.sql, "select * from t where a = $1 and b = '@B'");
/// assert_eq!(out.names, vec!["A".to_string()]);
/// ```
#[must_use]
pub fn to_positional(sql: &str, style: PlaceholderStyle) -> PositionalSql {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                b'[' if style == PlaceholderStyle::SqlServer => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, close)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = close;
                    }
                }
                b'@' if bytes.get(idx + 1) == Some(&b'@') => {
                    // system variable such as @@IDENTITY
                    idx += 1;
                    while idx + 1 < bytes.len() && is_identifier_byte(bytes[idx + 1]) {
                        idx += 1;
                    }
                }
                b'@' if idx == 0 || !is_identifier_byte(bytes[idx - 1]) => {
                    if let Some((end, name)) = scan_identifier(bytes, idx + 1) {
                        out.push_str(&sql[copied..idx]);
                        let position = if style.numbered() {
                            match names.iter().position(|n| n == name) {
                                Some(existing) => existing + 1,
                                None => {
                                    names.push(name.to_string());
                                    names.len()
                                }
                            }
                        } else {
                            names.push(name.to_string());
                            names.len()
                        };
                        style.push_placeholder(&mut out, position);
                        copied = end;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\\' && style == PlaceholderStyle::MySql {
                    idx += 1; // backslash escapes the next byte
                } else if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'\\' && style == PlaceholderStyle::MySql {
                    idx += 1;
                } else if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Bracketed => {
                if b == b']' {
                    if bytes.get(idx + 1) == Some(&b']') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if closes_dollar_quote(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    out.push_str(&sql[copied..]);
    PositionalSql { sql: out, names }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_styles_reuse_positions() {
        let sql = "select * from t where a = @A or b = @B or c = @A";
        let pg = to_positional(sql, PlaceholderStyle::Postgres);
        assert_eq!(pg.sql, "select * from t where a = $1 or b = $2 or c = $1");
        assert_eq!(pg.names, vec!["A", "B"]);

        let lite = to_positional(sql, PlaceholderStyle::Sqlite);
        assert_eq!(lite.sql, "select * from t where a = ?1 or b = ?2 or c = ?1");

        let ms = to_positional(sql, PlaceholderStyle::SqlServer);
        assert_eq!(ms.sql, "select * from t where a = @P1 or b = @P2 or c = @P1");
    }

    #[test]
    fn mysql_emits_one_marker_per_occurrence() {
        let out = to_positional("a = @A or c = @A", PlaceholderStyle::MySql);
        assert_eq!(out.sql, "a = ? or c = ?");
        assert_eq!(out.names, vec!["A", "A"]);
    }

    #[test]
    fn skips_literals_identifiers_and_comments() {
        let sql = "select '@x', \"@y\", `@z` -- @c\n/* @d /* @e */ */ from t where a = @a";
        let out = to_positional(sql, PlaceholderStyle::Postgres);
        assert_eq!(
            out.sql,
            "select '@x', \"@y\", `@z` -- @c\n/* @d /* @e */ */ from t where a = $1"
        );
        assert_eq!(out.names, vec!["a"]);
    }

    #[test]
    fn mysql_backslash_escapes_stay_inside_the_literal() {
        let sql = r"select * from t where `Name` = 'O\'Brien' and `Age` = @Age";
        let out = to_positional(sql, PlaceholderStyle::MySql);
        assert_eq!(
            out.sql,
            r"select * from t where `Name` = 'O\'Brien' and `Age` = ?"
        );
        assert_eq!(out.names, vec!["Age"]);

        let out = to_positional(r#"select "a\"@b" from t where c = @C"#, PlaceholderStyle::MySql);
        assert_eq!(out.names, vec!["C"]);

        // standard SQL keeps the backslash literal
        let pg = to_positional(r"select 'C:\' where a = @A", PlaceholderStyle::Postgres);
        assert_eq!(pg.sql, r"select 'C:\' where a = $1");
    }

    #[test]
    fn brackets_only_quote_for_sql_server() {
        let ms = to_positional("select [@x] from t where a = @a", PlaceholderStyle::SqlServer);
        assert_eq!(ms.sql, "select [@x] from t where a = @P1");

        let pg = to_positional("select arr[@i] from t", PlaceholderStyle::Postgres);
        assert_eq!(pg.sql, "select arr[$1] from t");
    }

    #[test]
    fn leaves_system_variables_operators_and_dollar_blocks() {
        let sql = "select @@IDENTITY, tags @> @Tags, me@host from t $q$ @no $q$";
        let out = to_positional(sql, PlaceholderStyle::Postgres);
        assert_eq!(
            out.sql,
            "select @@IDENTITY, tags @> $1, me@host from t $q$ @no $q$"
        );
        assert_eq!(out.names, vec!["Tags"]);
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let out = to_positional("select 'añejo' where n = @Name", PlaceholderStyle::Sqlite);
        assert_eq!(out.sql, "select 'añejo' where n = ?1");
    }

    #[test]
    fn bind_reports_missing_names() {
        let out = to_positional("a = @Age and b = @Name", PlaceholderStyle::Sqlite);
        let params = Params::new().with("age", 3);
        let err = out.bind(&params).unwrap_err();
        assert!(matches!(err, SqlCrudError::ParameterError(ref m) if m.contains("@Name")));

        let params = params.with("Name", "x");
        let values = out.bind(&params).unwrap();
        assert_eq!(values, vec![RowValues::Int(3), RowValues::Text("x".into())]);
    }
}
