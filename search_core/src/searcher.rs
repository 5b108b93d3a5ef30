//! Search façade
//!
//! Wires parameter resolution, group splitting, SQL resolution, execution and
//! reflection into single calls. A [`Searcher`] holds only immutable,
//! shareable components and can be used from many tasks at once.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SearchError;
use crate::executor::SqlExecutor;
use crate::group::split_groups;
use crate::pagination::PagingSpec;
use crate::param::{ParamResolver, SearchParams};
use crate::reflector::BeanReflector;
use crate::schema::SchemaDescriptor;
use crate::sql_resolver::{FetchType, SearchSql, SqlResolver, SqlStatement};

/// One page of records plus the number of records matching in total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub total: i64,
    pub data: Vec<T>,
}

#[derive(Clone)]
pub struct Searcher {
    param_resolver: ParamResolver,
    sql_resolver: SqlResolver,
    reflector: BeanReflector,
    executor: Arc<dyn SqlExecutor>,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("param_resolver", &self.param_resolver)
            .field("sql_resolver", &self.sql_resolver)
            .finish_non_exhaustive()
    }
}

impl Searcher {
    pub fn new(
        param_resolver: ParamResolver,
        sql_resolver: SqlResolver,
        executor: Arc<dyn SqlExecutor>,
    ) -> Self {
        let reflector = BeanReflector::new(sql_resolver.convertor().clone());
        Self {
            param_resolver,
            sql_resolver,
            reflector,
            executor,
        }
    }

    /// One page of records and the total count, fetched concurrently
    pub async fn search<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<SearchResult<T>, SearchError> {
        let (rows, total) = self.fetch_page(schema, params).await?;
        Ok(SearchResult {
            total,
            data: self.reflector.reflect_all(schema, &rows)?,
        })
    }

    /// One page of records without counting
    pub async fn search_list<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<Vec<T>, SearchError> {
        let sql = self.prepare(schema, params, FetchType::List)?;
        let rows = self.executor.fetch_rows(data_statement(&sql)?).await?;
        self.reflector.reflect_all(schema, &rows)
    }

    /// Every matching record; paging parameters are ignored
    pub async fn search_all<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<Vec<T>, SearchError> {
        let sql = self.prepare(schema, params, |_| FetchType::All)?;
        let rows = self.executor.fetch_rows(data_statement(&sql)?).await?;
        self.reflector.reflect_all(schema, &rows)
    }

    /// First matching record in the requested sort order
    pub async fn search_first<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<Option<T>, SearchError> {
        let sql = self.prepare(schema, params, |_| {
            FetchType::List(PagingSpec::new(0, 1))
        })?;
        let rows = self.executor.fetch_rows(data_statement(&sql)?).await?;
        rows.first()
            .map(|row| self.reflector.reflect(schema, row))
            .transpose()
    }

    pub async fn search_count(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<i64, SearchError> {
        let sql = self.prepare(schema, params, |_| FetchType::Count)?;
        let count = sql
            .count
            .as_ref()
            .ok_or_else(|| SearchError::Mapping("count statement was not generated".to_string()))?;
        self.executor.fetch_count(count).await
    }

    /// Like [`Searcher::search`], with converted field maps instead of records
    pub async fn search_maps(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<SearchResult<IndexMap<String, Value>>, SearchError> {
        let (rows, total) = self.fetch_page(schema, params).await?;
        Ok(SearchResult {
            total,
            data: self.reflector.reflect_all_maps(schema, &rows)?,
        })
    }

    pub async fn search_all_maps(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<Vec<IndexMap<String, Value>>, SearchError> {
        let sql = self.prepare(schema, params, |_| FetchType::All)?;
        let rows = self.executor.fetch_rows(data_statement(&sql)?).await?;
        self.reflector.reflect_all_maps(schema, &rows)
    }

    async fn fetch_page(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
    ) -> Result<(Vec<crate::executor::RawRow>, i64), SearchError> {
        let sql = self.prepare(schema, params, FetchType::Page)?;
        let data = data_statement(&sql)?;
        let count = sql
            .count
            .as_ref()
            .ok_or_else(|| SearchError::Mapping("count statement was not generated".to_string()))?;

        tokio::try_join!(
            self.executor.fetch_rows(data),
            self.executor.fetch_count(count)
        )
    }

    fn prepare(
        &self,
        schema: &SchemaDescriptor,
        params: &SearchParams,
        fetch: impl FnOnce(PagingSpec) -> FetchType,
    ) -> Result<SearchSql, SearchError> {
        let resolved = self.param_resolver.resolve(schema, params)?;
        crate::trace_log!("Resolved {} filters", resolved.filters.len());

        let groups = split_groups(schema, resolved.filters)?;
        self.sql_resolver
            .resolve(schema, &groups, &resolved.sort, fetch(resolved.paging))
    }
}

fn data_statement(sql: &SearchSql) -> Result<&SqlStatement, SearchError> {
    sql.data
        .as_ref()
        .ok_or_else(|| SearchError::Mapping("data statement was not generated".to_string()))
}
