//! Core SearchHaus functionality
//!
//! This module contains the main SearchHaus struct, which builds the shared
//! search components from configuration once and hands out the searcher.

use std::sync::Arc;
use std::time::Duration;

use config::{AppConfig, DatabaseConfig, SearchConfig};
use search_core::{
    Dialect, MySqlExecutor, ParamResolver, PgSqlExecutor, Searcher, SqlExecutor, SqlResolver,
};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::{MySqlPool, PgPool};
use type_mapping::FieldConvertor;

use crate::errors::SearchHausError;

/// Connection pool for the configured dialect
#[derive(Debug, Clone)]
pub enum DatabasePool {
    Postgres(PgPool),
    MySql(MySqlPool),
}

/// Main SearchHaus coordinator that owns the pool and the search components
#[derive(Debug, Clone)]
pub struct SearchHaus {
    pool: Option<DatabasePool>,
    dialect: Dialect,
    searcher: Searcher,
}

impl SearchHaus {
    /// Connect to the configured database and build the search components
    pub async fn new(config: AppConfig) -> Result<Self, SearchHausError> {
        let dialect = Dialect::from_name(&config.search.sql.dialect)?;

        let (pool, executor): (DatabasePool, Arc<dyn SqlExecutor>) = match dialect {
            Dialect::PostgreSql => {
                let pool = Self::pg_pool_options(&config.database)
                    .connect(&config.database.connection_string("postgresql"))
                    .await?;
                (
                    DatabasePool::Postgres(pool.clone()),
                    Arc::new(PgSqlExecutor::new(pool)),
                )
            }
            Dialect::MySql => {
                let pool = Self::mysql_pool_options(&config.database)
                    .connect(&config.database.connection_string("mysql"))
                    .await?;
                (
                    DatabasePool::MySql(pool.clone()),
                    Arc::new(MySqlExecutor::new(pool)),
                )
            }
            other => return Err(SearchHausError::UnsupportedBackend(other.to_string())),
        };

        crate::debug_log!("Connected SearchHaus with dialect {}", dialect);

        Ok(Self {
            pool: Some(pool),
            dialect,
            searcher: build_searcher(&config.search, executor)?,
        })
    }

    /// Build SearchHaus around a caller-supplied executor
    ///
    /// Works for every dialect, including those without a bundled driver.
    pub fn with_executor(
        search: &SearchConfig,
        executor: Arc<dyn SqlExecutor>,
    ) -> Result<Self, SearchHausError> {
        let searcher = build_searcher(search, executor)?;
        Ok(Self {
            pool: None,
            dialect: Dialect::from_name(&search.sql.dialect)?,
            searcher,
        })
    }

    /// Get the searcher
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Get database pool reference, if SearchHaus opened one
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), SearchHausError> {
        match &self.pool {
            Some(DatabasePool::Postgres(pool)) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            Some(DatabasePool::MySql(pool)) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            None => {}
        }
        Ok(())
    }

    fn pg_pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        let mut pool_options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }
        pool_options
    }

    fn mysql_pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
        let mut pool_options = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }
        pool_options
    }
}

/// Build a searcher from the search configuration and an executor
///
/// The configuration is validated first, so hand-built configs get the same
/// checks as loaded ones.
pub fn build_searcher(
    config: &SearchConfig,
    executor: Arc<dyn SqlExecutor>,
) -> Result<Searcher, SearchHausError> {
    config.validate()?;
    let dialect = Dialect::from_name(&config.sql.dialect)?;
    let param_resolver = ParamResolver::from_config(&config.params)?;
    let convertor = FieldConvertor::new(
        config.field_convertor.trues.clone(),
        config.field_convertor.falses.clone(),
        config.field_convertor.ignore_case,
    );

    Ok(Searcher::new(
        param_resolver,
        SqlResolver::new(dialect, convertor),
        executor,
    ))
}
