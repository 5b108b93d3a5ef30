//! Convenience re-exports for common SearchHaus usage
//!
//! This prelude module re-exports the most commonly used items from the SearchHaus crates,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use searchhaus::prelude::*;
//!
//! // Now you have access to all the common SearchHaus types and traits
//! ```

// Core SearchHaus components
pub use crate::core::{build_searcher, DatabasePool, SearchHaus};
pub use crate::errors::SearchHausError;

// Re-export centralized config
pub use config::{
    AppConfig, DatabaseConfig, FieldConvertorConfig, PaginationConfig, ParamsConfig,
    SearchConfig, SqlConfig,
};

// Re-export the search pipeline
pub use search_core::prelude::*;
pub use search_core::{SchemaBuilder, SearchSql};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use indexmap::IndexMap;
pub use serde::{Deserialize, Serialize};
pub use sqlx;
pub use tokio;
