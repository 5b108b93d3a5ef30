//! # SearchHaus
//!
//! Turns flat request parameters into safe, dialect-correct, paginated SQL
//! searches, splits filters between WHERE and HAVING, and maps rows back into
//! typed records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use searchhaus::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let searchhaus = SearchHaus::new(config).await?;
//!
//!     let schema = SchemaDescriptor::builder("users")
//!         .column("name", "name", FieldType::String)
//!         .column("age", "age", FieldType::Int)
//!         .build()?;
//!
//!     let params = SearchParams::new()
//!         .with("name", "John")
//!         .with("age_gt", "30")
//!         .with("page", "2")
//!         .with("size", "10");
//!
//!     let result: SearchResult<User> = searchhaus.searcher().search(&schema, &params).await?;
//!     println!("{} of {} users", result.data.len(), result.total);
//!
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod prelude;

pub use crate::core::{build_searcher, DatabasePool, SearchHaus};
pub use errors::SearchHausError;
