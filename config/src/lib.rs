//! # Configuration Management for SearchHaus
//!
//! This crate provides centralized configuration structures for all SearchHaus components:
//! the database connection, SQL dialect, request parameter conventions, pagination and
//! field conversion.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{DatabaseConfig, SearchConfig};
//!
//! let db_config = DatabaseConfig::new(
//!     "localhost".to_string(), 5432, "myapp".to_string(),
//!     "postgres".to_string(), "password".to_string(),
//!     1, 10, 30, 600, 3600,
//! );
//!
//! let mut search_config = SearchConfig::default();
//! search_config.sql.dialect = "postgresql".to_string();
//! search_config.params.pagination.max_allowed_size = 50;
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "myapp"
//! username = "postgres"
//! password = "password"
//! min_connections = 1
//! max_connections = 10
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//!
//! [search.sql]
//! dialect = "postgresql"
//!
//! [search.params]
//! separator = "_"
//! operator_key = "op"
//! ignore_case_key = "ic"
//! sort = "sort"
//! order = "order"
//!
//! [search.params.pagination]
//! type = "page"
//! default_size = 15
//! max_allowed_size = 100
//!
//! [search.field_convertor]
//! trues = ["1", "Y", "TRUE"]
//! falses = ["0", "N", "FALSE"]
//! ignore_case = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from searchhaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./searchhaus.toml";

pub const PAGINATION_TYPE_PAGE: &str = "page";
pub const PAGINATION_TYPE_OFFSET: &str = "offset";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Everything the search pipeline reads at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub sql: SqlConfig,
    pub params: ParamsConfig,
    pub field_convertor: FieldConvertorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// One of `mysql`, `oracle`, `postgresql`, `sqlserver`
    pub dialect: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            dialect: "mysql".to_string(),
        }
    }
}

/// Request parameter naming conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub separator: String,
    pub operator_key: String,
    pub ignore_case_key: String,
    pub sort: String,
    pub order: String,
    /// Upper bound on the number of request parameters, 0 disables the check
    pub max_param_count: usize,
    pub pagination: PaginationConfig,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            operator_key: "op".to_string(),
            ignore_case_key: "ic".to_string(),
            sort: "sort".to_string(),
            order: "order".to_string(),
            max_param_count: 150,
            pagination: PaginationConfig::default(),
        }
    }
}

/// Pagination parameter bindings and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// `page` or `offset`
    #[serde(rename = "type")]
    pub pagination_type: String,
    pub page: String,
    pub size: String,
    pub offset: String,
    pub max: String,
    /// First page number or first offset; defaults to 1 for `page`, 0 for `offset`
    pub start: Option<i64>,
    pub default_size: i64,
    pub max_allowed_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            pagination_type: PAGINATION_TYPE_PAGE.to_string(),
            page: "page".to_string(),
            size: "size".to_string(),
            offset: "offset".to_string(),
            max: "max".to_string(),
            start: None,
            default_size: 15,
            max_allowed_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Start index, resolved against the pagination type
    pub fn effective_start(&self) -> i64 {
        self.start.unwrap_or(
            if self.pagination_type.eq_ignore_ascii_case(PAGINATION_TYPE_OFFSET) {
                0
            } else {
                1
            },
        )
    }
}

/// Boolean coercion rules applied when mapping rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConvertorConfig {
    pub trues: Vec<String>,
    pub falses: Vec<String>,
    pub ignore_case: bool,
}

impl Default for FieldConvertorConfig {
    fn default() -> Self {
        Self {
            trues: ["1", "Y", "YES", "T", "TRUE", "ON"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            falses: ["0", "N", "NO", "F", "FALSE", "OFF"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_case: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            // A missing .env file is fine, the variable may come from the environment
            match dotenvy::dotenv() {
                Ok(_) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }

            if let Ok(config_path) = env::var("SEARCHHAUS_CONFIG") {
                Self::from_file(&config_path)
            } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as SEARCHHAUS_CONFIG or in {} file",
                    DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // Database validations
        if self.database.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        self.search.validate()
    }
}

impl SearchConfig {
    /// Validate search values that can be checked without building components
    ///
    /// Dialect and pagination type names are checked when the components are
    /// built, so they fail with the pipeline's own configuration error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.params;
        if params.separator.is_empty() {
            return Err(ConfigError::Invalid(
                "Params separator cannot be empty".to_string(),
            ));
        }
        if params.operator_key.is_empty() || params.ignore_case_key.is_empty() {
            return Err(ConfigError::Invalid(
                "Params operator_key and ignore_case_key cannot be empty".to_string(),
            ));
        }
        if params.operator_key == params.ignore_case_key {
            return Err(ConfigError::Invalid(
                "Params operator_key and ignore_case_key must differ".to_string(),
            ));
        }
        if params.sort.is_empty() || params.order.is_empty() {
            return Err(ConfigError::Invalid(
                "Params sort and order names cannot be empty".to_string(),
            ));
        }

        let pagination = &params.pagination;
        if pagination.max_allowed_size < 1 {
            return Err(ConfigError::Invalid(
                "Pagination max_allowed_size must be greater than 0".to_string(),
            ));
        }
        if pagination.default_size < 1 || pagination.default_size > pagination.max_allowed_size {
            return Err(ConfigError::Invalid(format!(
                "Pagination default_size must be between 1 and {}",
                pagination.max_allowed_size
            )));
        }
        if pagination.effective_start() < 0 {
            return Err(ConfigError::Invalid(
                "Pagination start cannot be negative".to_string(),
            ));
        }

        let convertor = &self.field_convertor;
        let fold = |value: &String| {
            let value = value.trim();
            if convertor.ignore_case {
                value.to_uppercase()
            } else {
                value.to_string()
            }
        };
        let falses: Vec<String> = convertor.falses.iter().map(fold).collect();
        let overlaps = convertor.trues.iter().map(fold).any(|t| falses.contains(&t));
        if overlaps {
            return Err(ConfigError::Invalid(
                "Field convertor trues and falses must not overlap".to_string(),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
        }
    }

    /// Build connection string for the given URL scheme (`postgresql`, `mysql`)
    pub fn connection_string(&self, scheme: &str) -> String {
        format!(
            "{}://{}:{}@{}:{}/{}",
            scheme, self.username, self.password, self.host, self.port, self.database
        )
    }
}
