//! Sort specifications

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Ordered list of (field, direction) pairs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec(Vec<(String, SortOrder)>);

impl SortSpec {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.0.push((field.into(), order));
        self
    }

    pub fn push(&mut self, field: impl Into<String>, order: SortOrder) {
        self.0.push((field.into(), order));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.0.iter().map(|(field, order)| (field.as_str(), *order))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
