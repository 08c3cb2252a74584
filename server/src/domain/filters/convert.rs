//! Literal to typed value conversion

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;

use super::error::FilterError;
use super::operator::OPERATOR_SEPARATOR;
use super::schema::{FieldPath, SemanticType};
use super::value::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Result of converting one raw filter value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Typed(Value),
    /// `operator:literal` on a numeric or temporal field, kept raw for range merging
    Ranged(String),
}

/// Convert a raw value for `field`, deferring operator tokens on ranged types.
pub fn convert_literal(field: &FieldPath, raw: &str) -> Result<Literal, FilterError> {
    if raw.contains(OPERATOR_SEPARATOR) && field.ty.supports_range() {
        return Ok(Literal::Ranged(raw.to_string()));
    }
    convert_value(field, raw).map(Literal::Typed)
}

/// Convert `raw` into the semantic type of `field`.
///
/// Booleans never fail (anything but a case-insensitive `true` is `false`).
/// Types without a declared conversion pass the literal through as
/// [`Value::Raw`]; JSON columns cannot be compared to a value at all.
pub fn convert_value(field: &FieldPath, raw: &str) -> Result<Value, FilterError> {
    let invalid = || FilterError::conversion(field.key(), raw, field.ty);

    match field.ty {
        SemanticType::Text => Ok(Value::Text(raw.to_string())),
        SemanticType::Int16 => raw.parse().map(Value::Int16).map_err(|_| invalid()),
        SemanticType::Integer32 => raw.parse().map(Value::Int32).map_err(|_| invalid()),
        SemanticType::Integer64 => raw.parse().map(Value::Int64).map_err(|_| invalid()),
        SemanticType::Float32 => raw.parse().map(Value::Float32).map_err(|_| invalid()),
        SemanticType::Float64 => raw.parse().map(Value::Float64).map_err(|_| invalid()),
        SemanticType::DecimalExact => Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map(Value::Decimal)
            .map_err(|_| invalid()),
        SemanticType::IntegerBig => BigInt::from_str(raw)
            .map(Value::BigInt)
            .map_err(|_| invalid()),
        SemanticType::Boolean => Ok(Value::Bool(raw.eq_ignore_ascii_case("true"))),
        SemanticType::Date => parse_date(raw).map(Value::Date).ok_or_else(invalid),
        SemanticType::DateTime => parse_date_time(raw)
            .map(Value::DateTime)
            .ok_or_else(invalid),
        SemanticType::Enum(e) => e
            .member(raw)
            .map(|m| Value::Enum(m.to_string()))
            .ok_or_else(invalid),
        SemanticType::JsonDocument => Err(FilterError::unsupported(field.key(), field.ty)),
        SemanticType::Other(_) => Ok(Value::Raw(raw.to_string())),
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Date-time with a `T` separator, or a bare date at start of day
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if raw.contains('T') {
        DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    } else {
        parse_date(raw).map(|date| date.and_time(NaiveTime::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::schema::EnumType;

    static STATUS: EnumType = EnumType {
        name: "Status",
        members: &["ATIVO", "INATIVO"],
    };

    fn field(ty: SemanticType) -> FieldPath {
        FieldPath::new(vec!["campo".into()], ty)
    }

    #[test]
    fn test_text_is_unchanged() {
        assert_eq!(
            convert_value(&field(SemanticType::Text), "São Paulo").unwrap(),
            Value::Text("São Paulo".into())
        );
    }

    #[test]
    fn test_numeric_kinds() {
        assert_eq!(
            convert_value(&field(SemanticType::Int16), "-12").unwrap(),
            Value::Int16(-12)
        );
        assert_eq!(
            convert_value(&field(SemanticType::Integer32), "42").unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            convert_value(&field(SemanticType::Integer64), "9000000000").unwrap(),
            Value::Int64(9_000_000_000)
        );
        assert_eq!(
            convert_value(&field(SemanticType::Float64), "2.5").unwrap(),
            Value::Float64(2.5)
        );
        assert_eq!(
            convert_value(&field(SemanticType::DecimalExact), "19.90").unwrap(),
            Value::Decimal(Decimal::from_str("19.90").unwrap())
        );
        assert_eq!(
            convert_value(&field(SemanticType::IntegerBig), "123456789012345678901234567890")
                .unwrap(),
            Value::BigInt(BigInt::from_str("123456789012345678901234567890").unwrap())
        );
    }

    #[test]
    fn test_int16_overflow_is_conversion_error() {
        let err = convert_value(&field(SemanticType::Int16), "40000").unwrap_err();
        assert_eq!(err, FilterError::conversion("campo", "40000", SemanticType::Int16));
    }

    #[test]
    fn test_malformed_number_is_conversion_error() {
        let err = convert_value(&field(SemanticType::Integer32), "dez").unwrap_err();
        assert_eq!(
            err,
            FilterError::ValueConversion {
                field: "campo".into(),
                literal: "dez".into(),
                target: "integer32",
            }
        );
    }

    #[test]
    fn test_boolean_never_fails() {
        let f = field(SemanticType::Boolean);
        assert_eq!(convert_value(&f, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(convert_value(&f, "false").unwrap(), Value::Bool(false));
        assert_eq!(convert_value(&f, "yes").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_date_and_date_time() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 17).unwrap();
        assert_eq!(
            convert_value(&field(SemanticType::Date), "2023-05-17").unwrap(),
            Value::Date(date)
        );
        assert_eq!(
            convert_value(&field(SemanticType::DateTime), "2023-05-17").unwrap(),
            Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            convert_value(&field(SemanticType::DateTime), "2023-05-17T08:15:30").unwrap(),
            Value::DateTime(date.and_hms_opt(8, 15, 30).unwrap())
        );
        assert_eq!(
            convert_value(&field(SemanticType::DateTime), "2023-05-17T08:15").unwrap(),
            Value::DateTime(date.and_hms_opt(8, 15, 0).unwrap())
        );
        assert!(convert_value(&field(SemanticType::Date), "17/05/2023").is_err());
    }

    #[test]
    fn test_enum_exact_match() {
        let f = field(SemanticType::Enum(&STATUS));
        assert_eq!(
            convert_value(&f, "ATIVO").unwrap(),
            Value::Enum("ATIVO".into())
        );
        assert!(convert_value(&f, "ativo").is_err());
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let f = field(SemanticType::Other("uuid"));
        assert_eq!(
            convert_value(&f, "a1b2").unwrap(),
            Value::Raw("a1b2".into())
        );
    }

    #[test]
    fn test_json_column_is_unsupported() {
        let err = convert_value(&field(SemanticType::JsonDocument), "x").unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_FILTER_TYPE");
    }

    #[test]
    fn test_convert_literal_defers_operator_tokens_on_ranged_types() {
        assert_eq!(
            convert_literal(&field(SemanticType::Integer32), "gte:10").unwrap(),
            Literal::Ranged("gte:10".into())
        );
        assert_eq!(
            convert_literal(&field(SemanticType::Date), "lte:2023-12-31").unwrap(),
            Literal::Ranged("lte:2023-12-31".into())
        );
    }

    #[test]
    fn test_convert_literal_keeps_colons_in_text() {
        assert_eq!(
            convert_literal(&field(SemanticType::Text), "10:30").unwrap(),
            Literal::Typed(Value::Text("10:30".into()))
        );
    }
}
