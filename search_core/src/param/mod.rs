//! Request parameters
//!
//! This module turns the flat key/value mapping of a search request into
//! structured filters, a sort specification and paging input.

pub mod field_param;
pub mod filter;
pub mod operator;
pub mod resolver;

use indexmap::IndexMap;

pub use field_param::FieldParam;
pub use filter::{ParamFilter, SizeLimitParamFilter};
pub use operator::{Arity, Operator};
pub use resolver::{ParamResolver, ResolvedParams};

/// Value of one request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    /// First value, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v.as_str()),
            ParamValue::Multi(vs) => vs.first().map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            ParamValue::Single(v) => std::slice::from_ref(v),
            ParamValue::Multi(vs) => vs,
        };
        values.iter().map(String::as_str)
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ParamValue::Multi(_))
    }
}

impl From<String> for ParamValue {
    fn from(val: String) -> Self {
        ParamValue::Single(val)
    }
}

impl From<&str> for ParamValue {
    fn from(val: &str) -> Self {
        ParamValue::Single(val.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(val: Vec<String>) -> Self {
        ParamValue::Multi(val)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(val: Vec<&str>) -> Self {
        ParamValue::Multi(val.into_iter().map(str::to_string).collect())
    }
}

/// Ordered request parameters; iteration follows first insertion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams(IndexMap<String, ParamValue>);

impl SearchParams {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter; re-inserting a key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// First value of `key`, if present
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(ParamValue::first)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SearchParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
