//! Validation module
//!
//! Logical field names end up as quoted column aliases in generated SQL and
//! as keys of request parameters, so they are restricted to plain identifiers.

use std::fmt;

/// Validation errors for schema descriptors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric and underscore allowed)
    InvalidCharacters(String),
    /// Name is longer than the most restrictive supported dialect allows
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Name starts with invalid character (must start with letter or underscore)
    InvalidStartCharacter(String),
    /// The same logical field was declared twice
    DuplicateField(String),
    /// A field or the table was declared with a blank SQL expression
    EmptyExpression(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(
                    f,
                    "Invalid characters in name '{}': only alphanumeric characters and underscores are allowed",
                    name
                )
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::InvalidStartCharacter(name) => {
                write!(f, "Name '{}' must start with a letter or underscore", name)
            }
            ValidationError::DuplicateField(name) => {
                write!(f, "Field '{}' is declared more than once", name)
            }
            ValidationError::EmptyExpression(name) => {
                write!(f, "Expression for '{}' cannot be empty", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated logical field name that is safe to use as a SQL alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    /// Identifier length limit shared by every supported dialect
    const MAX_LENGTH: usize = 63;

    /// Create a new validated field name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the validated name as a String
    pub fn into_string(self) -> String {
        self.0
    }

    fn validate_identifier(name: &str) -> Result<(), ValidationError> {
        let first_char = name.chars().next().ok_or(ValidationError::Empty)?;

        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if !first_char.is_ascii_alphabetic() && first_char != '_' {
            return Err(ValidationError::InvalidStartCharacter(name.to_string()));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ValidatedFieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_field_names() {
        for name in ["name", "_hidden", "order_total", "Field2"] {
            assert!(ValidatedFieldName::new(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_field_names() {
        assert_eq!(ValidatedFieldName::new(""), Err(ValidationError::Empty));
        assert_eq!(
            ValidatedFieldName::new("2fast"),
            Err(ValidationError::InvalidStartCharacter("2fast".to_string()))
        );
        assert_eq!(
            ValidatedFieldName::new("name\"; DROP"),
            Err(ValidationError::InvalidCharacters("name\"; DROP".to_string()))
        );
        assert!(matches!(
            ValidatedFieldName::new(&"a".repeat(64)),
            Err(ValidationError::TooLong { length: 64, .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::DuplicateField("age".to_string());
        assert_eq!(err.to_string(), "Field 'age' is declared more than once");
    }
}
