//! Parameter filters
//!
//! Filters run over the raw request parameters before they are resolved. They
//! may rewrite the mapping or reject the whole request.

use super::SearchParams;
use crate::errors::SearchError;
use crate::schema::SchemaDescriptor;

/// Hook applied to raw parameters before resolution
pub trait ParamFilter: Send + Sync {
    fn filter(
        &self,
        schema: &SchemaDescriptor,
        params: SearchParams,
    ) -> Result<SearchParams, SearchError>;
}

/// Rejects requests that carry more parameters than allowed
#[derive(Debug, Clone, Copy)]
pub struct SizeLimitParamFilter {
    max_param_count: usize,
}

impl SizeLimitParamFilter {
    pub fn new(max_param_count: usize) -> Self {
        Self { max_param_count }
    }
}

impl ParamFilter for SizeLimitParamFilter {
    fn filter(
        &self,
        _schema: &SchemaDescriptor,
        params: SearchParams,
    ) -> Result<SearchParams, SearchError> {
        if params.len() > self.max_param_count {
            return Err(SearchError::invalid_param(format!(
                "too many parameters: {} (max {})",
                params.len(),
                self.max_param_count
            )));
        }
        Ok(params)
    }
}
