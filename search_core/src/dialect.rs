//! SQL dialects
//!
//! Each dialect knows how its database spells placeholders, quoted
//! identifiers, string literals and row limits. Generated SQL never inlines
//! request values; paging bounds are bound like any other parameter.

use std::fmt;
use std::str::FromStr;

use type_mapping::SqlValue;

use crate::errors::SearchError;
use crate::pagination::PagingSpec;

/// Supported databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Oracle,
    PostgreSql,
    SqlServer,
}

/// A statement wrapped for paging plus the binds the wrapper introduced
#[derive(Debug, Clone, PartialEq)]
pub struct PaginateSql {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Dialect {
    /// Look a dialect up by name, ignoring case
    pub fn from_name(name: &str) -> Result<Self, SearchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "oracle" => Ok(Dialect::Oracle),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "sqlserver" => Ok(Dialect::SqlServer),
            other => Err(SearchError::Config(format!(
                "unsupported SQL dialect '{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
            Dialect::PostgreSql => "postgresql",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Placeholder for the 1-based bind `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::PostgreSql => format!("${}", index),
            _ => "?".to_string(),
        }
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            Dialect::Oracle | Dialect::PostgreSql => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::SqlServer => format!("[{}]", name.replace(']', "]]")),
        }
    }

    pub fn escape_literal(&self, value: &str) -> String {
        let escaped = match self {
            Dialect::MySql => value.replace('\\', "\\\\").replace('\'', "''"),
            _ => value.replace('\'', "''"),
        };
        format!("'{}'", escaped)
    }

    /// Restrict `sql` to the rows described by `paging`
    ///
    /// `next_index` is the 1-based index of the first placeholder the wrapper
    /// may use; it only matters for dialects with numbered placeholders.
    pub fn paginate(&self, sql: &str, paging: &PagingSpec, next_index: usize) -> PaginateSql {
        let offset = SqlValue::Int(paging.offset());
        let limit = SqlValue::Int(paging.limit());

        match self {
            Dialect::MySql => PaginateSql {
                sql: format!("{} LIMIT ? OFFSET ?", sql),
                params: vec![limit, offset],
            },
            Dialect::PostgreSql => PaginateSql {
                sql: format!(
                    "{} LIMIT {} OFFSET {}",
                    sql,
                    self.placeholder(next_index),
                    self.placeholder(next_index + 1)
                ),
                params: vec![limit, offset],
            },
            Dialect::SqlServer => {
                // OFFSET/FETCH is only valid after an ORDER BY
                let order = if has_top_level_order_by(sql) {
                    ""
                } else {
                    " ORDER BY (SELECT NULL)"
                };
                PaginateSql {
                    sql: format!("{}{} OFFSET ? ROWS FETCH NEXT ? ROWS ONLY", sql, order),
                    params: vec![offset, limit],
                }
            }
            Dialect::Oracle => PaginateSql {
                sql: format!(
                    "SELECT * FROM (SELECT row_.*, ROWNUM rownum_ FROM ({}) row_ WHERE ROWNUM <= ?) WHERE rownum_ > ?",
                    sql
                ),
                params: vec![SqlValue::Int(paging.end()), offset],
            },
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Whether `sql` ends in an ORDER BY outside of any parentheses
fn has_top_level_order_by(sql: &str) -> bool {
    let upper = sql.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    let mut depth = 0i32;
    let mut found = false;

    for (idx, byte) in bytes.iter().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'O' if depth == 0 && upper[idx..].starts_with("ORDER BY") => found = true,
            _ => {}
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Dialect::from_name("MySQL").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_name("postgres").unwrap(), Dialect::PostgreSql);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!(Dialect::from_name(" oracle ").unwrap(), Dialect::Oracle);
        assert_eq!(Dialect::from_name("SQLSERVER").unwrap(), Dialect::SqlServer);
        assert!(matches!(
            Dialect::from_name("sqlite"),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::PostgreSql.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::Oracle.placeholder(1), "?");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::MySql.quote_identifier("name"), "`name`");
        assert_eq!(Dialect::MySql.quote_identifier("a`b"), "`a``b`");
        assert_eq!(Dialect::PostgreSql.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::Oracle.quote_identifier("name"), "\"name\"");
        assert_eq!(Dialect::SqlServer.quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(Dialect::PostgreSql.escape_literal("O'Brien"), "'O''Brien'");
        assert_eq!(Dialect::MySql.escape_literal("a\\'b"), "'a\\\\''b'");
        assert_eq!(Dialect::SqlServer.escape_literal("a\\b"), "'a\\b'");
    }

    #[test]
    fn test_paginate_mysql() {
        let paged = Dialect::MySql.paginate("SELECT 1", &PagingSpec::new(10, 10), 3);
        assert_eq!(paged.sql, "SELECT 1 LIMIT ? OFFSET ?");
        assert_eq!(paged.params, vec![SqlValue::Int(10), SqlValue::Int(10)]);
    }

    #[test]
    fn test_paginate_postgres_numbers_after_existing_binds() {
        let paged = Dialect::PostgreSql.paginate("SELECT 1", &PagingSpec::new(40, 20), 3);
        assert_eq!(paged.sql, "SELECT 1 LIMIT $3 OFFSET $4");
        assert_eq!(paged.params, vec![SqlValue::Int(20), SqlValue::Int(40)]);
    }

    #[test]
    fn test_paginate_sqlserver() {
        let paged = Dialect::SqlServer.paginate("SELECT a FROM t", &PagingSpec::new(0, 5), 1);
        assert_eq!(
            paged.sql,
            "SELECT a FROM t ORDER BY (SELECT NULL) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
        );
        assert_eq!(paged.params, vec![SqlValue::Int(0), SqlValue::Int(5)]);

        let paged = Dialect::SqlServer.paginate(
            "SELECT a FROM t ORDER BY SUM(a) DESC",
            &PagingSpec::new(5, 5),
            1,
        );
        assert_eq!(
            paged.sql,
            "SELECT a FROM t ORDER BY SUM(a) DESC OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
        );
    }

    #[test]
    fn test_paginate_oracle() {
        let paged = Dialect::Oracle.paginate("SELECT a FROM t", &PagingSpec::new(10, 10), 1);
        assert_eq!(
            paged.sql,
            "SELECT * FROM (SELECT row_.*, ROWNUM rownum_ FROM (SELECT a FROM t) row_ WHERE ROWNUM <= ?) WHERE rownum_ > ?"
        );
        assert_eq!(paged.params, vec![SqlValue::Int(20), SqlValue::Int(10)]);
    }

    #[test]
    fn test_order_by_detection_ignores_subqueries() {
        assert!(!has_top_level_order_by(
            "SELECT * FROM (SELECT a FROM t ORDER BY a) x"
        ));
        assert!(has_top_level_order_by("select a from t order by a"));
    }
}
