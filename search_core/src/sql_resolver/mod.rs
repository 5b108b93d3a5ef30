//! SQL resolution
//!
//! Turns a schema, the WHERE/HAVING groups, a sort and a fetch type into the
//! data and count statements of one search. Both statements share the same
//! predicate text and the same filter binds; only the data statement carries
//! paging binds.

mod sql_generation;


use type_mapping::{FieldConvertor, SqlValue};

use crate::dialect::Dialect;
use crate::errors::SearchError;
use crate::group::GroupPair;
use crate::ordering::SortSpec;
use crate::pagination::PagingSpec;
use crate::schema::{FieldExpr, SchemaDescriptor};

use sql_generation::SqlGenerator;

/// SQL text plus its positional binds
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Statements for one search; either may be absent depending on [`FetchType`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSql {
    pub data: Option<SqlStatement>,
    pub count: Option<SqlStatement>,
}

/// What a search needs to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchType {
    /// One page of rows plus the total count
    Page(PagingSpec),
    /// One page of rows
    List(PagingSpec),
    /// Every matching row
    All,
    /// Only the total count
    Count,
}

impl FetchType {
    fn paging(&self) -> Option<&PagingSpec> {
        match self {
            FetchType::Page(paging) | FetchType::List(paging) => Some(paging),
            FetchType::All | FetchType::Count => None,
        }
    }

    fn wants_data(&self) -> bool {
        !matches!(self, FetchType::Count)
    }

    fn wants_count(&self) -> bool {
        matches!(self, FetchType::Page(_) | FetchType::Count)
    }
}

/// Builds dialect-specific statements
#[derive(Debug, Clone)]
pub struct SqlResolver {
    dialect: Dialect,
    convertor: FieldConvertor,
}

impl SqlResolver {
    pub fn new(dialect: Dialect, convertor: FieldConvertor) -> Self {
        Self { dialect, convertor }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn convertor(&self) -> &FieldConvertor {
        &self.convertor
    }

    pub fn resolve(
        &self,
        schema: &SchemaDescriptor,
        groups: &GroupPair,
        sort: &SortSpec,
        fetch: FetchType,
    ) -> Result<SearchSql, SearchError> {
        let order_by = self.build_order_by(schema, sort)?;

        let mut generator = SqlGenerator::new(self.dialect, &self.convertor);
        let where_clause = generator.build_clause(schema, groups.where_group.payload())?;
        let having_clause = generator.build_clause(schema, groups.having_group.payload())?;
        let params = generator.into_params();

        let grouped = schema.has_aggregates() || having_clause.is_some();
        let group_by = if grouped {
            Self::group_by_expr(schema)
        } else {
            None
        };

        let mut body = format!("FROM {}", schema.table());
        if let Some(where_clause) = &where_clause {
            body.push_str(" WHERE ");
            body.push_str(where_clause);
        }
        if let Some(group_by) = &group_by {
            body.push_str(" GROUP BY ");
            body.push_str(group_by);
        }
        if let Some(having_clause) = &having_clause {
            body.push_str(" HAVING ");
            body.push_str(having_clause);
        }

        let select = format!("SELECT {} {}", self.select_list(schema), body);

        let data = if fetch.wants_data() {
            let mut sql = select.clone();
            if let Some(order_by) = &order_by {
                sql.push_str(" ORDER BY ");
                sql.push_str(order_by);
            }
            let statement = match fetch.paging() {
                Some(paging) => {
                    let paged = self.dialect.paginate(&sql, paging, params.len() + 1);
                    let mut all_params = params.clone();
                    all_params.extend(paged.params);
                    SqlStatement {
                        sql: paged.sql,
                        params: all_params,
                    }
                }
                None => SqlStatement {
                    sql,
                    params: params.clone(),
                },
            };
            crate::debug_log!(
                "Data SQL: {} ({} binds)",
                statement.sql,
                statement.params.len()
            );
            Some(statement)
        } else {
            None
        };

        let count = if fetch.wants_count() {
            let sql = if grouped {
                format!("SELECT COUNT(*) FROM ({}) tbl_count_", select)
            } else {
                format!("SELECT COUNT(*) {}", body)
            };
            crate::debug_log!("Count SQL: {} ({} binds)", sql, params.len());
            Some(SqlStatement { sql, params })
        } else {
            None
        };

        Ok(SearchSql { data, count })
    }

    fn select_list(&self, schema: &SchemaDescriptor) -> String {
        schema
            .fields()
            .map(|field| {
                format!(
                    "{} AS {}",
                    field.expr().sql(),
                    self.dialect.quote_identifier(field.name())
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn group_by_expr(schema: &SchemaDescriptor) -> Option<String> {
        if let Some(explicit) = schema.group_by() {
            return Some(explicit.to_string());
        }

        let columns: Vec<&str> = schema
            .fields()
            .filter_map(|field| match field.expr() {
                FieldExpr::Column(sql) => Some(sql.as_str()),
                FieldExpr::Aggregate(_) => None,
            })
            .collect();

        if columns.is_empty() {
            None
        } else {
            Some(columns.join(", "))
        }
    }

    /// Validates every sort field before any SQL is produced
    fn build_order_by(
        &self,
        schema: &SchemaDescriptor,
        sort: &SortSpec,
    ) -> Result<Option<String>, SearchError> {
        if sort.is_empty() {
            return Ok(None);
        }

        let items = sort
            .iter()
            .map(|(name, order)| {
                schema
                    .field(name)
                    .map(|field| format!("{} {}", field.expr().sql(), order.to_sql()))
                    .ok_or_else(|| SearchError::invalid_field(name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(items.join(", ")))
    }
}
