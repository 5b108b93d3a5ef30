//! Statement execution
//!
//! Executors run generated statements against a pool and hand rows back as
//! ordered column maps of [`SqlValue`]s. Typing those values is the
//! reflector's job.

use async_trait::async_trait;
use indexmap::IndexMap;
use type_mapping::SqlValue;

use crate::errors::SearchError;
use crate::sql_resolver::SqlStatement;

/// One row keyed by column label, in select-list order
pub type RawRow = IndexMap<String, SqlValue>;

// Shared binding logic for every sqlx backend
macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            type_mapping::SqlValue::Null => $query.bind(Option::<String>::None),
            type_mapping::SqlValue::Bool(b) => $query.bind(*b),
            type_mapping::SqlValue::Int(i) => $query.bind(*i),
            type_mapping::SqlValue::Float(f) => $query.bind(*f),
            type_mapping::SqlValue::Text(s) => $query.bind(s.as_str()),
            type_mapping::SqlValue::Date(d) => $query.bind(*d),
            type_mapping::SqlValue::DateTime(dt) => $query.bind(*dt),
            type_mapping::SqlValue::Uuid(u) => $query.bind(*u),
            type_mapping::SqlValue::Json(j) => $query.bind(sqlx::types::Json(j.clone())),
        }
    };
}

pub mod mysql;
pub mod postgres;

pub use mysql::MySqlExecutor;
pub use postgres::PgSqlExecutor;

/// Runs statements produced by the SQL resolver
///
/// Every call checks out its own connection and releases it before
/// returning, so two calls may run concurrently.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn fetch_rows(&self, statement: &SqlStatement) -> Result<Vec<RawRow>, SearchError>;

    /// Single `COUNT(*)` value
    async fn fetch_count(&self, statement: &SqlStatement) -> Result<i64, SearchError>;
}
