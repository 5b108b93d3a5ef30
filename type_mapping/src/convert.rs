//! Field conversion
//!
//! Converts raw scalars returned by the data source into the semantic type a
//! field is declared with, and request parameters into typed bind values.

use crate::errors::ConvertError;
use crate::parse::{parse_date, parse_datetime};
use crate::types::{FieldType, SqlValue};
use serde_json::{Number, Value};

const DEFAULT_TRUES: &[&str] = &["1", "Y", "YES", "T", "TRUE", "ON"];
const DEFAULT_FALSES: &[&str] = &["0", "N", "NO", "F", "FALSE", "OFF"];

/// Converts raw values into declared field types
///
/// Boolean conversion is driven by membership in a true set and a false set.
/// With `ignore_case` both sets are stored upper-cased and candidates are
/// upper-cased before the lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConvertor {
    trues: Vec<String>,
    falses: Vec<String>,
    ignore_case: bool,
}

impl Default for FieldConvertor {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRUES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_FALSES.iter().map(|s| s.to_string()).collect(),
            true,
        )
    }
}

impl FieldConvertor {
    pub fn new(trues: Vec<String>, falses: Vec<String>, ignore_case: bool) -> Self {
        let normalize = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|v| {
                    let v = v.trim().to_string();
                    if ignore_case {
                        v.to_uppercase()
                    } else {
                        v
                    }
                })
                .collect()
        };

        Self {
            trues: normalize(trues),
            falses: normalize(falses),
            ignore_case,
        }
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Map a string onto a boolean via the configured sets
    pub fn to_bool(&self, text: &str) -> Result<bool, ConvertError> {
        let text = text.trim();
        let candidate = if self.ignore_case {
            text.to_uppercase()
        } else {
            text.to_string()
        };

        if self.trues.iter().any(|t| *t == candidate) {
            Ok(true)
        } else if self.falses.iter().any(|f| *f == candidate) {
            Ok(false)
        } else {
            Err(ConvertError::UnknownBoolean(text.to_string()))
        }
    }

    /// Convert a raw column value into the JSON form of `target`
    ///
    /// NULL converts to JSON null for every target type.
    pub fn convert(&self, raw: &SqlValue, target: FieldType) -> Result<Value, ConvertError> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match target {
            FieldType::Bool => self.convert_bool(raw).map(Value::Bool),
            FieldType::Int => convert_int(raw).map(Value::from),
            FieldType::Float => convert_float(raw).and_then(|f| float_to_json(f, raw)),
            FieldType::String => Ok(Value::String(raw.to_string())),
            FieldType::Date => match raw {
                SqlValue::Date(d) => Ok(*d),
                SqlValue::DateTime(dt) => Ok(dt.date()),
                SqlValue::Text(s) => parse_date(s).ok_or_else(|| unparsable(s, target)),
                other => Err(incompatible(other, target)),
            }
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
            FieldType::DateTime => match raw {
                SqlValue::DateTime(dt) => Ok(*dt),
                SqlValue::Date(d) => Ok(d.and_time(chrono::NaiveTime::MIN)),
                SqlValue::Text(s) => parse_datetime(s).ok_or_else(|| unparsable(s, target)),
                other => Err(incompatible(other, target)),
            }
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            FieldType::Json => Ok(match raw {
                SqlValue::Json(v) => v.clone(),
                SqlValue::Bool(b) => Value::Bool(*b),
                SqlValue::Int(i) => Value::from(*i),
                SqlValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
                other => Value::String(other.to_string()),
            }),
        }
    }

    /// Convert a request operand into the bind value for a field of type `target`
    pub fn convert_param(&self, text: &str, target: FieldType) -> Result<SqlValue, ConvertError> {
        let trimmed = text.trim();
        match target {
            FieldType::Bool => self.to_bool(trimmed).map(SqlValue::Bool),
            FieldType::Int => trimmed
                .parse::<i64>()
                .map(SqlValue::Int)
                .map_err(|_| unparsable(text, target)),
            FieldType::Float => trimmed
                .parse::<f64>()
                .map(SqlValue::Float)
                .map_err(|_| unparsable(text, target)),
            FieldType::Date => parse_date(trimmed)
                .map(SqlValue::Date)
                .ok_or_else(|| unparsable(text, target)),
            FieldType::DateTime => parse_datetime(trimmed)
                .map(SqlValue::DateTime)
                .ok_or_else(|| unparsable(text, target)),
            FieldType::String | FieldType::Json => Ok(SqlValue::Text(text.to_string())),
        }
    }

    fn convert_bool(&self, raw: &SqlValue) -> Result<bool, ConvertError> {
        match raw {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(i) => self.to_bool(&i.to_string()),
            SqlValue::Text(s) => self.to_bool(s),
            other => Err(incompatible(other, FieldType::Bool)),
        }
    }
}

fn convert_int(raw: &SqlValue) -> Result<i64, ConvertError> {
    match raw {
        SqlValue::Int(i) => Ok(*i),
        SqlValue::Bool(b) => Ok(i64::from(*b)),
        SqlValue::Float(f) => integral(*f).ok_or_else(|| incompatible(raw, FieldType::Int)),
        // Decimal columns arrive as text such as "12.00"
        SqlValue::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed.parse::<f64>().ok().and_then(integral)
                })
                .ok_or_else(|| unparsable(s, FieldType::Int))
        }
        other => Err(incompatible(other, FieldType::Int)),
    }
}

/// Whole floats within the `i64` range
fn integral(f: f64) -> Option<i64> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0; // 2^63

    (f.is_finite() && f.fract() == 0.0 && (-BOUND..BOUND).contains(&f)).then_some(f as i64)
}

fn convert_float(raw: &SqlValue) -> Result<f64, ConvertError> {
    match raw {
        SqlValue::Float(f) => Ok(*f),
        SqlValue::Int(i) => Ok(*i as f64),
        SqlValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| unparsable(s, FieldType::Float)),
        other => Err(incompatible(other, FieldType::Float)),
    }
}

fn float_to_json(value: f64, raw: &SqlValue) -> Result<Value, ConvertError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| incompatible(raw, FieldType::Float))
}

fn incompatible(raw: &SqlValue, target: FieldType) -> ConvertError {
    ConvertError::Incompatible {
        kind: raw.kind(),
        value: raw.to_string(),
        target,
    }
}

fn unparsable(text: &str, target: FieldType) -> ConvertError {
    ConvertError::Unparsable {
        value: text.to_string(),
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn yn_convertor(ignore_case: bool) -> FieldConvertor {
        FieldConvertor::new(
            vec!["1".to_string(), "Y".to_string()],
            vec!["0".to_string(), "N".to_string()],
            ignore_case,
        )
    }

    #[test]
    fn test_bool_ignore_case() {
        let convertor = yn_convertor(true);
        let to_bool = |s: &str| convertor.convert(&SqlValue::from(s), FieldType::Bool);

        assert_eq!(to_bool("y"), Ok(json!(true)));
        assert_eq!(to_bool("n"), Ok(json!(false)));
        assert_eq!(to_bool("Y"), Ok(json!(true)));
        assert_eq!(
            to_bool("X"),
            Err(ConvertError::UnknownBoolean("X".to_string()))
        );
    }

    #[test]
    fn test_bool_case_sensitive() {
        let convertor = yn_convertor(false);
        assert_eq!(convertor.to_bool("Y"), Ok(true));
        assert!(convertor.to_bool("y").is_err());
    }

    #[test]
    fn test_bool_from_numbers_uses_sets() {
        let convertor = yn_convertor(true);
        assert_eq!(
            convertor.convert(&SqlValue::Int(1), FieldType::Bool),
            Ok(json!(true))
        );
        assert_eq!(
            convertor.convert(&SqlValue::Int(0), FieldType::Bool),
            Ok(json!(false))
        );
        assert!(convertor.convert(&SqlValue::Int(2), FieldType::Bool).is_err());
        assert_eq!(
            convertor.convert(&SqlValue::Bool(true), FieldType::Bool),
            Ok(json!(true))
        );
    }

    #[test]
    fn test_null_passes_through_every_type() {
        let convertor = FieldConvertor::default();
        for target in [
            FieldType::Bool,
            FieldType::Int,
            FieldType::Float,
            FieldType::String,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::Json,
        ] {
            assert_eq!(convertor.convert(&SqlValue::Null, target), Ok(Value::Null));
        }
    }

    #[test]
    fn test_numeric_conversions() {
        let convertor = FieldConvertor::default();
        assert_eq!(
            convertor.convert(&SqlValue::from("42"), FieldType::Int),
            Ok(json!(42))
        );
        assert_eq!(
            convertor.convert(&SqlValue::Float(7.0), FieldType::Int),
            Ok(json!(7))
        );
        assert!(convertor.convert(&SqlValue::Float(7.5), FieldType::Int).is_err());
        assert_eq!(
            convertor.convert(&SqlValue::from("12.00"), FieldType::Int),
            Ok(json!(12))
        );
        assert!(convertor.convert(&SqlValue::from("12.5"), FieldType::Int).is_err());
        assert_eq!(
            convertor.convert(&SqlValue::from("-9223372036854775808"), FieldType::Int),
            Ok(json!(i64::MIN))
        );
        for out_of_range in ["1e20", "99999999999999999999", "-1e19"] {
            assert!(matches!(
                convertor.convert(&SqlValue::from(out_of_range), FieldType::Int),
                Err(ConvertError::Unparsable { .. })
            ));
        }
        assert!(matches!(
            convertor.convert(&SqlValue::Float(1e19), FieldType::Int),
            Err(ConvertError::Incompatible { .. })
        ));
        assert_eq!(
            convertor.convert(&SqlValue::Int(3), FieldType::Float),
            Ok(json!(3.0))
        );
        assert!(convertor
            .convert(&SqlValue::Float(f64::NAN), FieldType::Float)
            .is_err());
        assert!(matches!(
            convertor.convert(&SqlValue::from("abc"), FieldType::Float),
            Err(ConvertError::Unparsable { .. })
        ));
    }

    #[test]
    fn test_date_conversions() {
        let convertor = FieldConvertor::default();
        let dt = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();

        assert_eq!(
            convertor.convert(&SqlValue::DateTime(dt), FieldType::Date),
            Ok(json!("2024-05-06"))
        );
        assert_eq!(
            convertor.convert(&SqlValue::DateTime(dt), FieldType::DateTime),
            Ok(json!("2024-05-06T07:08:09"))
        );
        assert_eq!(
            convertor.convert(&SqlValue::from("2024-05-06"), FieldType::DateTime),
            Ok(json!("2024-05-06T00:00:00"))
        );
        assert!(matches!(
            convertor.convert(&SqlValue::Int(5), FieldType::Date),
            Err(ConvertError::Incompatible { kind: "int", .. })
        ));
    }

    #[test]
    fn test_string_target_uses_display_form() {
        let convertor = FieldConvertor::default();
        assert_eq!(
            convertor.convert(&SqlValue::Int(12), FieldType::String),
            Ok(json!("12"))
        );
        assert_eq!(
            convertor.convert(&SqlValue::Bool(false), FieldType::String),
            Ok(json!("false"))
        );
    }

    #[test]
    fn test_convert_param_by_field_type() {
        let convertor = FieldConvertor::default();
        assert_eq!(
            convertor.convert_param("30", FieldType::Int),
            Ok(SqlValue::Int(30))
        );
        assert_eq!(
            convertor.convert_param("yes", FieldType::Bool),
            Ok(SqlValue::Bool(true))
        );
        assert_eq!(
            convertor.convert_param("2020-02-29", FieldType::Date),
            Ok(SqlValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()))
        );
        assert_eq!(
            convertor.convert_param(" John ", FieldType::String),
            Ok(SqlValue::Text(" John ".to_string()))
        );
        assert!(convertor.convert_param("thirty", FieldType::Int).is_err());
    }
}
