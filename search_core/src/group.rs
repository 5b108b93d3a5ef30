//! WHERE / HAVING partitioning
//!
//! Filters on aggregate fields can only be evaluated after grouping, so they
//! move into the HAVING group. Everything else stays in WHERE.

use crate::errors::SearchError;
use crate::param::FieldParam;
use crate::schema::SchemaDescriptor;

/// Named partition of filters
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    name: &'static str,
    payload: T,
}

impl<T> Group<T> {
    pub const fn new(name: &'static str, payload: T) -> Self {
        Self { name, payload }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl Group<Vec<FieldParam>> {
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldParam> {
        self.payload.iter()
    }
}

/// The WHERE and HAVING groups of one search
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPair {
    pub where_group: Group<Vec<FieldParam>>,
    pub having_group: Group<Vec<FieldParam>>,
}

impl GroupPair {
    pub const WHERE: &'static str = "where";
    pub const HAVING: &'static str = "having";

    /// No filters at all
    pub const EMPTY: GroupPair = GroupPair {
        where_group: Group::new(Self::WHERE, Vec::new()),
        having_group: Group::new(Self::HAVING, Vec::new()),
    };

    pub fn is_empty(&self) -> bool {
        self.where_group.is_empty() && self.having_group.is_empty()
    }
}

/// Partition `filters` into WHERE and HAVING groups, preserving input order
pub fn split_groups(
    schema: &SchemaDescriptor,
    filters: Vec<FieldParam>,
) -> Result<GroupPair, SearchError> {
    if filters.is_empty() {
        return Ok(GroupPair::EMPTY);
    }

    let mut where_filters = Vec::new();
    let mut having_filters = Vec::new();
    for filter in filters {
        let field = schema
            .field(filter.field())
            .ok_or_else(|| SearchError::invalid_field(filter.field()))?;
        if field.is_aggregate() {
            having_filters.push(filter);
        } else {
            where_filters.push(filter);
        }
    }

    Ok(GroupPair {
        where_group: Group::new(GroupPair::WHERE, where_filters),
        having_group: Group::new(GroupPair::HAVING, having_filters),
    })
}
