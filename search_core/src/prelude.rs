//! Common imports for search-core users
//!
//! ```rust
//! use search_core::prelude::*;
//! ```

pub use crate::dialect::Dialect;
pub use crate::errors::SearchError;
pub use crate::executor::{MySqlExecutor, PgSqlExecutor, RawRow, SqlExecutor};
pub use crate::group::{split_groups, GroupPair};
pub use crate::ordering::{SortOrder, SortSpec};
pub use crate::pagination::{Pagination, PagingSpec};
pub use crate::param::{
    FieldParam, Operator, ParamFilter, ParamResolver, ParamValue, SearchParams,
    SizeLimitParamFilter,
};
pub use crate::reflector::BeanReflector;
pub use crate::schema::SchemaDescriptor;
pub use crate::searcher::{SearchResult, Searcher};
pub use crate::sql_resolver::{FetchType, SqlResolver, SqlStatement};

pub use type_mapping::{FieldConvertor, FieldType, SqlValue};
