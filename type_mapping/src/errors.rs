//! Error types for value conversion
//!
//! This module defines the errors raised when a raw value or a request
//! parameter cannot be mapped onto its declared field type.

use crate::types::FieldType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Value '{0}' is in neither the true set nor the false set")]
    UnknownBoolean(String),

    #[error("Cannot convert {kind} value '{value}' to {target}")]
    Incompatible {
        kind: &'static str,
        value: String,
        target: FieldType,
    },

    #[error("Cannot parse '{value}' as {target}")]
    Unparsable { value: String, target: FieldType },
}
