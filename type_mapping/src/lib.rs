//! Unified value mapping between database scalars, request parameters and records
//! This crate provides the conversion logic used across the searchhaus ecosystem

pub mod convert;
pub mod errors;
pub mod parse;
pub mod types;

pub use convert::FieldConvertor;
pub use errors::ConvertError;
pub use parse::{parse_date, parse_datetime};
pub use types::{FieldType, SqlValue};
