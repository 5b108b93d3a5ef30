//! Error types for the SearchHaus crate
//!
//! This module contains all error types that can be returned while setting
//! SearchHaus up or running searches through it.

use config::ConfigError;
use search_core::SearchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("No executor available for dialect '{0}'; supply one with SearchHaus::with_executor")]
    UnsupportedBackend(String),
}
