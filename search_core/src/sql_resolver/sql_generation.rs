//! Predicate rendering
//!
//! Operands are converted to typed binds here, where the declared field type
//! is known. Placeholders are numbered in the order binds are pushed, so the
//! bind list always lines up with the SQL text.

use type_mapping::{FieldConvertor, FieldType, SqlValue};

use crate::dialect::Dialect;
use crate::errors::SearchError;
use crate::param::{FieldParam, Operator};
use crate::schema::{FieldMeta, SchemaDescriptor};

pub(crate) struct SqlGenerator<'a> {
    dialect: Dialect,
    convertor: &'a FieldConvertor,
    params: Vec<SqlValue>,
}

impl<'a> SqlGenerator<'a> {
    pub(crate) fn new(dialect: Dialect, convertor: &'a FieldConvertor) -> Self {
        Self {
            dialect,
            convertor,
            params: Vec::new(),
        }
    }

    /// Render `filters` joined with AND, or `None` when there are none
    pub(crate) fn build_clause(
        &mut self,
        schema: &SchemaDescriptor,
        filters: &[FieldParam],
    ) -> Result<Option<String>, SearchError> {
        if filters.is_empty() {
            return Ok(None);
        }

        let conditions = filters
            .iter()
            .map(|param| {
                let meta = schema
                    .field(param.field())
                    .ok_or_else(|| SearchError::invalid_field(param.field()))?;
                self.build_condition(meta, param)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(conditions.join(" AND ")))
    }

    pub(crate) fn into_params(self) -> Vec<SqlValue> {
        self.params
    }

    fn build_condition(
        &mut self,
        meta: &FieldMeta,
        param: &FieldParam,
    ) -> Result<String, SearchError> {
        let upper = param.ignore_case() && meta.field_type() == FieldType::String;
        let expr = if upper {
            format!("UPPER({})", meta.expr().sql())
        } else {
            meta.expr().sql().to_string()
        };

        let operator = param.operator();
        let values = param.values();

        let sql = match operator {
            Operator::IsNull => format!("{} IS NULL", expr),
            Operator::NotNull => format!("{} IS NOT NULL", expr),
            Operator::Between => {
                let low = self.bind(meta, param, &values[0], upper)?;
                let high = self.bind(meta, param, &values[1], upper)?;
                format!("{} BETWEEN {} AND {}", expr, low, high)
            }
            Operator::In | Operator::NotIn => {
                let placeholders = values
                    .iter()
                    .map(|value| self.bind(meta, param, value, upper))
                    .collect::<Result<Vec<_>, _>>()?;
                format!(
                    "{} {} ({})",
                    expr,
                    operator_sql(operator),
                    placeholders.join(", ")
                )
            }
            _ => {
                let placeholder = self.bind(meta, param, &values[0], upper)?;
                format!("{} {} {}", expr, operator_sql(operator), placeholder)
            }
        };

        Ok(sql)
    }

    fn bind(
        &mut self,
        meta: &FieldMeta,
        param: &FieldParam,
        value: &str,
        upper: bool,
    ) -> Result<String, SearchError> {
        let bound = if upper {
            SqlValue::Text(value.to_uppercase())
        } else if param.operator().is_pattern() {
            SqlValue::Text(value.to_string())
        } else {
            self.convertor
                .convert_param(value, meta.field_type())
                .map_err(|e| {
                    SearchError::invalid_param(format!("field '{}': {}", meta.name(), e))
                })?
        };

        self.params.push(bound);
        Ok(self.dialect.placeholder(self.params.len()))
    }
}

fn operator_sql(operator: Operator) -> &'static str {
    match operator {
        Operator::Equal => "=",
        Operator::NotEqual => "<>",
        Operator::GreaterThan => ">",
        Operator::GreaterEqual => ">=",
        Operator::LessThan => "<",
        Operator::LessEqual => "<=",
        Operator::Like => "LIKE",
        Operator::NotLike => "NOT LIKE",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
        Operator::IsNull => "IS NULL",
        Operator::NotNull => "IS NOT NULL",
        Operator::Between => "BETWEEN",
    }
}
