//! Field-level type and width validation.
//!
//! A field value goes through two checks before it is stored on a record:
//! [`validate_type`] reads it as the field's declared semantic type, and
//! [`validate_fixed_width`] renders it into exactly the column width. The
//! stored form is always the rendered string, never the raw input.

use crate::decimal::Amount;
use crate::error::ValidationError;
use crate::record::Record;
use crate::schema::FieldType;
use log::{debug, error};
use std::fmt;
use std::str::FromStr;

/// A candidate value for a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(Amount),
}

impl FieldValue {
    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => FieldType::Text.name(),
            FieldValue::Integer(_) => FieldType::Integer.name(),
            FieldValue::Decimal(_) => FieldType::Decimal.name(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Decimal(a) => write!(f, "{a}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Amount> for FieldValue {
    fn from(value: Amount) -> Self {
        FieldValue::Decimal(value)
    }
}

/// Checks `value` against the declared type and returns it in that type.
///
/// Numeric types accept text that parses as a number and reject anything
/// negative. Text accepts only text.
pub fn validate_type(value: &FieldValue, expected: FieldType) -> Result<FieldValue, ValidationError> {
    debug!("validate_type value='{}' expected={}", value, expected.name());

    let accepted = match (expected, value) {
        (FieldType::Integer, FieldValue::Text(raw)) => {
            let n = i64::from_str(raw.trim()).map_err(|e| type_error(expected, raw, e))?;
            FieldValue::Integer(n)
        }
        (FieldType::Integer, FieldValue::Integer(n)) => FieldValue::Integer(*n),
        (FieldType::Decimal, FieldValue::Text(raw)) => {
            let a = Amount::from_str(raw).map_err(|e| type_error(expected, raw, e))?;
            FieldValue::Decimal(a)
        }
        (FieldType::Decimal, FieldValue::Integer(n)) => FieldValue::Decimal(Amount::from(*n)),
        (FieldType::Decimal, FieldValue::Decimal(a)) => FieldValue::Decimal(*a),
        (FieldType::Text, FieldValue::Text(s)) => FieldValue::Text(s.clone()),
        (_, other) => {
            error!(
                "Type mismatch: expected {}, got {}",
                expected.name(),
                other.type_name()
            );
            return Err(ValidationError::Type {
                expected: expected.name(),
                value: other.to_string(),
                reason: format!("value is {}", other.type_name()),
            });
        }
    };

    let negative = match &accepted {
        FieldValue::Integer(n) => *n < 0,
        FieldValue::Decimal(a) => a.is_negative(),
        FieldValue::Text(_) => false,
    };
    if negative {
        error!("Type validation error: negative value '{}'", value);
        return Err(ValidationError::Negative {
            expected: expected.name(),
            value: value.to_string(),
        });
    }

    Ok(accepted)
}

fn type_error(expected: FieldType, raw: &str, cause: impl fmt::Display) -> ValidationError {
    error!("Type validation error: '{}' is not {}: {}", raw, expected.name(), cause);
    ValidationError::Type {
        expected: expected.name(),
        value: raw.to_string(),
        reason: cause.to_string(),
    }
}

/// Renders `value` into exactly `width` characters.
///
/// Integers are zero-padded, decimals are zero-padded with 2 fraction digits
/// and text is right-justified with leading spaces. A rendering longer than
/// `width` is an error; nothing is truncated.
pub fn validate_fixed_width(value: &FieldValue, width: usize) -> Result<String, ValidationError> {
    let formatted = match value {
        FieldValue::Integer(n) => format!("{:0width$}", n, width = width),
        FieldValue::Decimal(a) => a.to_fixed_width(width),
        FieldValue::Text(s) => format!("{:>width$}", s, width = width),
    };

    if formatted.chars().count() > width {
        error!("Formatted value '{}' exceeds maximum width of {}.", formatted, width);
        return Err(ValidationError::Width { formatted, width });
    }

    debug!("formatted_value='{}'", formatted);
    Ok(formatted)
}

/// Validates `value` for one field of `record` and stores the formatted form.
///
/// On error the record is left untouched.
pub fn validate_field<R: Record>(
    record: &mut R,
    field_name: &str,
    value: impl Into<FieldValue>,
) -> Result<(), ValidationError> {
    let value = value.into();
    let spec = R::KIND.field(field_name)?;
    debug!(
        "validate_field {}.{} value='{}' type={} width={}",
        R::KIND,
        field_name,
        value,
        spec.field_type.name(),
        spec.width
    );

    let accepted = validate_type(&value, spec.field_type)?;
    let formatted = validate_fixed_width(&accepted, spec.width)?;

    let slot = record
        .slot_mut(spec.name)
        .ok_or_else(|| ValidationError::UnknownField {
            kind: R::KIND,
            field: field_name.to_string(),
        })?;
    *slot = formatted;
    debug!("Field '{}' set to '{}'", spec.name, slot);
    Ok(())
}

/// Runs [`validate_field`] over every field of a freshly populated record,
/// replacing each raw value with its formatted form.
pub fn validate_record<R: Record>(record: &mut R) -> Result<(), ValidationError> {
    debug!("validate_record for {}", R::KIND);
    for spec in R::KIND.fields() {
        let raw = record.get(spec.name).unwrap_or_default().to_string();
        validate_field(record, spec.name, raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Footer;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_validate_type_accepts_numeric_text() {
        assert_eq!(
            validate_type(&text("000001"), FieldType::Integer),
            Ok(FieldValue::Integer(1))
        );
        assert_eq!(
            validate_type(&text("100.5"), FieldType::Decimal),
            Ok(FieldValue::Decimal("100.50".parse().unwrap()))
        );
        assert_eq!(
            validate_type(&text(" John "), FieldType::Text),
            Ok(text(" John "))
        );
    }

    #[test]
    fn test_validate_type_rejects_negative_decimal() {
        let err = validate_type(&text("-5"), FieldType::Decimal).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { .. }));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_validate_type_rejects_negative_integer() {
        let err = validate_type(&FieldValue::Integer(-1), FieldType::Integer).unwrap_err();
        assert!(matches!(err, ValidationError::Negative { .. }));
    }

    #[test]
    fn test_validate_type_rejects_non_numeric() {
        let err = validate_type(&text("abc"), FieldType::Decimal).unwrap_err();
        assert!(matches!(err, ValidationError::Type { .. }));

        let err = validate_type(&text("1.5"), FieldType::Integer).unwrap_err();
        assert!(matches!(err, ValidationError::Type { .. }));
    }

    #[test]
    fn test_validate_type_rejects_number_for_text() {
        let err = validate_type(&FieldValue::Integer(7), FieldType::Text).unwrap_err();
        assert!(matches!(err, ValidationError::Type { .. }));
    }

    #[test]
    fn test_fixed_width_formats_by_type() {
        assert_eq!(validate_fixed_width(&FieldValue::Integer(2), 6), Ok("000002".to_string()));
        assert_eq!(
            validate_fixed_width(&FieldValue::Decimal("150".parse().unwrap()), 12),
            Ok("000000150.00".to_string())
        );
        assert_eq!(validate_fixed_width(&text("USD"), 5), Ok("  USD".to_string()));
    }

    #[test]
    fn test_fixed_width_rejects_overflow() {
        let err = validate_fixed_width(&text("TOOLONG"), 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Width {
                formatted: "TOOLONG".to_string(),
                width: 3
            }
        );

        let err = validate_fixed_width(&FieldValue::Integer(1_000_000), 6).unwrap_err();
        assert!(matches!(err, ValidationError::Width { width: 6, .. }));
    }

    #[test]
    fn test_fixed_width_is_idempotent() {
        let once = validate_fixed_width(&text("John"), 28).unwrap();
        let twice = validate_fixed_width(&text(&once), 28).unwrap();
        assert_eq!(once, twice);

        let typed = validate_type(&text("7.1"), FieldType::Decimal).unwrap();
        let once = validate_fixed_width(&typed, 12).unwrap();
        let typed = validate_type(&text(&once), FieldType::Decimal).unwrap();
        let twice = validate_fixed_width(&typed, 12).unwrap();
        assert_eq!(once, "000000007.10");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_field_stores_formatted_value() {
        let mut footer = Footer::blank();
        validate_field(&mut footer, "control_sum", "42").unwrap();
        assert_eq!(footer.control_sum(), "000000042.00");

        validate_field(&mut footer, "total_counter", 3i64).unwrap();
        assert_eq!(footer.total_counter(), "000003");
    }

    #[test]
    fn test_validate_field_failure_leaves_record_unchanged() {
        let mut footer = Footer::blank();
        validate_field(&mut footer, "control_sum", "10").unwrap();

        assert!(validate_field(&mut footer, "control_sum", "-1").is_err());
        assert!(validate_field(&mut footer, "control_sum", "99999999999").is_err());
        assert_eq!(footer.control_sum(), "000000010.00");
    }

    #[test]
    fn test_validate_field_unknown_name() {
        let mut footer = Footer::blank();
        let err = validate_field(&mut footer, "amount", "1").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }
}
