//! Error types for the search pipeline
//!
//! Every failure is returned to the immediate caller; nothing in the pipeline
//! logs and swallows an error.

use thiserror::Error;
use type_mapping::ConvertError;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Schema error: {0}")]
    Schema(#[from] ValidationError),

    #[error("Query execution failed for `{sql}`: {source}")]
    Execution {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConvertError),

    #[error("Mapping error: {0}")]
    Mapping(String),
}

impl SearchError {
    /// Wrap a data source failure together with the statement that caused it
    pub fn execution(sql: &str, source: sqlx::Error) -> Self {
        Self::Execution {
            sql: sql.to_string(),
            source,
        }
    }

    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidParam(message.into())
    }

    pub fn invalid_field(field: &str) -> Self {
        Self::InvalidField(format!("'{}' is not a searchable field", field))
    }
}
