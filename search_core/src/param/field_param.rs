//! Field filters

use std::fmt;

use super::operator::Operator;
use crate::errors::SearchError;

/// One predicate over a logical field
///
/// Operands stay as request text; they are converted to typed bind values when
/// SQL is generated, where the declared field type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParam {
    field: String,
    operator: Operator,
    values: Vec<String>,
    ignore_case: bool,
}

impl FieldParam {
    /// Build a filter, rejecting operand counts the operator cannot take
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        values: Vec<String>,
        ignore_case: bool,
    ) -> Result<Self, SearchError> {
        let field = field.into();
        let arity = operator.arity();
        if !arity.accepts(values.len()) {
            return Err(SearchError::invalid_param(format!(
                "operator '{}' on field '{}' takes {}, got {}",
                operator,
                field,
                arity,
                values.len()
            )));
        }

        Ok(Self {
            field,
            operator,
            values,
            ignore_case,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

impl fmt::Display for FieldParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.field, self.operator, self.values)?;
        if self.ignore_case {
            write!(f, " (ignore case)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_is_enforced() {
        assert!(FieldParam::new("age", Operator::Between, vec!["1".to_string()], false).is_err());
        assert!(FieldParam::new("age", Operator::IsNull, vec!["1".to_string()], false).is_err());
        assert!(FieldParam::new("age", Operator::In, vec![], false).is_err());

        let param = FieldParam::new(
            "age",
            Operator::Between,
            vec!["18".to_string(), "30".to_string()],
            false,
        )
        .unwrap();
        assert_eq!(param.values(), ["18", "30"]);
        assert_eq!(param.operator(), Operator::Between);
    }
}
