//! # search-core
//!
//! Turns flat request parameters into safe, dialect-specific SQL, runs it and
//! maps the rows back into typed records.
//!
//! The pipeline is
//! [`ParamResolver`] → [`split_groups`] → [`SqlResolver`] → [`SqlExecutor`] →
//! [`BeanReflector`], and [`Searcher`] drives it end to end.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod dialect;
pub mod errors;
pub mod executor;
pub mod group;
pub mod ordering;
pub mod pagination;
pub mod param;
pub mod prelude;
pub mod reflector;
pub mod schema;
pub mod searcher;
pub mod sql_resolver;
pub mod validation;

pub use dialect::{Dialect, PaginateSql};
pub use errors::SearchError;
pub use executor::{MySqlExecutor, PgSqlExecutor, RawRow, SqlExecutor};
pub use group::{split_groups, Group, GroupPair};
pub use ordering::{SortOrder, SortSpec};
pub use pagination::{MaxOffsetPagination, PageNumPagination, Pagination, PagingSpec};
pub use param::{
    Arity, FieldParam, Operator, ParamFilter, ParamResolver, ParamValue, ResolvedParams,
    SearchParams, SizeLimitParamFilter,
};
pub use reflector::BeanReflector;
pub use schema::{FieldExpr, FieldMeta, SchemaBuilder, SchemaDescriptor};
pub use searcher::{SearchResult, Searcher};
pub use sql_resolver::{FetchType, SearchSql, SqlResolver, SqlStatement};
pub use validation::{ValidatedFieldName, ValidationError};
