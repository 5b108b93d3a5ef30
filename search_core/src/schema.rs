//! Schema descriptors
//!
//! A [`SchemaDescriptor`] tells the pipeline which logical fields can be
//! searched, the SQL expression behind each of them, and whether that
//! expression is an aggregate. It is built once by the caller and only ever
//! read by the pipeline.

use indexmap::IndexMap;
use type_mapping::FieldType;

use crate::validation::{ValidatedFieldName, ValidationError};

/// SQL expression backing a logical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldExpr {
    /// Plain column or scalar expression, usable in WHERE and GROUP BY
    Column(String),
    /// Aggregate expression such as `SUM(o.amount)`, usable in HAVING only
    Aggregate(String),
}

impl FieldExpr {
    pub fn sql(&self) -> &str {
        match self {
            FieldExpr::Column(sql) | FieldExpr::Aggregate(sql) => sql,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, FieldExpr::Aggregate(_))
    }
}

/// One searchable field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    name: ValidatedFieldName,
    expr: FieldExpr,
    field_type: FieldType,
}

impl FieldMeta {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn expr(&self) -> &FieldExpr {
        &self.expr
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_aggregate(&self) -> bool {
        self.expr.is_aggregate()
    }
}

/// Read-only description of a searchable entity
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    table: String,
    fields: IndexMap<String, FieldMeta>,
    group_by: Option<String>,
}

impl SchemaDescriptor {
    /// Start describing an entity selected from `table` (a table name or a
    /// full join expression)
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            fields: Vec::new(),
            group_by: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Explicit GROUP BY expression, if one was declared
    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn has_aggregates(&self) -> bool {
        self.fields.values().any(FieldMeta::is_aggregate)
    }
}

/// Builder for [`SchemaDescriptor`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    table: String,
    fields: Vec<(String, FieldExpr, FieldType)>,
    group_by: Option<String>,
}

impl SchemaBuilder {
    /// Declare a field backed by a plain column expression
    ///
    /// The executors decode booleans, numbers, dates, times, UUID, JSON,
    /// binary and text columns. Other column types (Postgres `INTERVAL` or
    /// `INET`, for instance) must be cast to text in `expr`, e.g.
    /// `"addr::text"`, or the search fails with an execution error.
    pub fn column(mut self, name: &str, expr: &str, field_type: FieldType) -> Self {
        self.fields.push((
            name.to_string(),
            FieldExpr::Column(expr.to_string()),
            field_type,
        ));
        self
    }

    /// Declare a field backed by an aggregate expression
    pub fn aggregate(mut self, name: &str, expr: &str, field_type: FieldType) -> Self {
        self.fields.push((
            name.to_string(),
            FieldExpr::Aggregate(expr.to_string()),
            field_type,
        ));
        self
    }

    /// Override the GROUP BY expression derived from the plain columns
    pub fn group_by(mut self, expr: &str) -> Self {
        self.group_by = Some(expr.to_string());
        self
    }

    pub fn build(self) -> Result<SchemaDescriptor, ValidationError> {
        if self.table.trim().is_empty() {
            return Err(ValidationError::EmptyExpression("table".to_string()));
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, expr, field_type) in self.fields {
            let name = ValidatedFieldName::new(&name)?;
            if expr.sql().trim().is_empty() {
                return Err(ValidationError::EmptyExpression(name.into_string()));
            }
            if fields.contains_key(name.as_str()) {
                return Err(ValidationError::DuplicateField(name.into_string()));
            }
            fields.insert(
                name.as_str().to_string(),
                FieldMeta {
                    name,
                    expr,
                    field_type,
                },
            );
        }

        if let Some(group_by) = &self.group_by {
            if group_by.trim().is_empty() {
                return Err(ValidationError::EmptyExpression("group_by".to_string()));
            }
        }

        Ok(SchemaDescriptor {
            table: self.table,
            fields,
            group_by: self.group_by,
        })
    }
}
