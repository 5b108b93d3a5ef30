//! Row reflection
//!
//! Raw rows are converted field by field into the declared semantic types
//! and then either returned as maps or deserialized into caller types.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use type_mapping::FieldConvertor;

use crate::errors::SearchError;
use crate::executor::RawRow;
use crate::schema::SchemaDescriptor;

/// Builds records out of raw rows
#[derive(Debug, Clone, Default)]
pub struct BeanReflector {
    convertor: FieldConvertor,
}

impl BeanReflector {
    pub fn new(convertor: FieldConvertor) -> Self {
        Self { convertor }
    }

    /// Converted field values in schema declaration order
    pub fn reflect_map(
        &self,
        schema: &SchemaDescriptor,
        row: &RawRow,
    ) -> Result<IndexMap<String, Value>, SearchError> {
        let mut converted = IndexMap::with_capacity(schema.len());
        for field in schema.fields() {
            let raw = row.get(field.name()).ok_or_else(|| {
                SearchError::Mapping(format!("column '{}' missing from result row", field.name()))
            })?;
            converted.insert(
                field.name().to_string(),
                self.convertor.convert(raw, field.field_type())?,
            );
        }
        Ok(converted)
    }

    pub fn reflect<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        row: &RawRow,
    ) -> Result<T, SearchError> {
        let object: Map<String, Value> = self.reflect_map(schema, row)?.into_iter().collect();
        serde_json::from_value(Value::Object(object))
            .map_err(|e| SearchError::Mapping(format!("cannot build record: {}", e)))
    }

    pub fn reflect_all<T: DeserializeOwned>(
        &self,
        schema: &SchemaDescriptor,
        rows: &[RawRow],
    ) -> Result<Vec<T>, SearchError> {
        rows.iter().map(|row| self.reflect(schema, row)).collect()
    }

    pub fn reflect_all_maps(
        &self,
        schema: &SchemaDescriptor,
        rows: &[RawRow],
    ) -> Result<Vec<IndexMap<String, Value>>, SearchError> {
        rows.iter().map(|row| self.reflect_map(schema, row)).collect()
    }
}
