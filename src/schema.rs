//! Fixed-width layout of the batch file.
//!
//! Every record line is [`LINE_WIDTH`] characters: a 2-character tag followed
//! by the fields listed in the schema table for that record kind. The table is
//! the single source of field type, offset and width for both the record
//! factory and the field validator.

use crate::error::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Exact length of every record line, excluding the line terminator.
pub const LINE_WIDTH: usize = 120;

/// Width of the record tag prefix.
pub const TAG_WIDTH: usize = 2;

/// Inclusive bounds on the number of transaction lines in a file.
pub const MIN_TRANSACTIONS: usize = 1;
pub const MAX_TRANSACTIONS: usize = 20_000;

/// Semantic type a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free text, right-justified with leading spaces.
    Text,
    /// Non-negative integer, zero-padded.
    Integer,
    /// Non-negative decimal with 2 fraction digits, zero-padded.
    Decimal,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "an integer",
            FieldType::Decimal => "a decimal",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal)
    }
}

/// Declarative description of one column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Character offset of the field within the line.
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    const fn new(name: &'static str, field_type: FieldType, offset: usize, width: usize) -> Self {
        FieldSpec {
            name,
            field_type,
            offset,
            width,
        }
    }

    /// Exclusive end offset within the line.
    pub fn end(&self) -> usize {
        self.offset + self.width
    }
}

const HEADER_FIELDS: [FieldSpec; 4] = [
    FieldSpec::new("name", FieldType::Text, 2, 28),
    FieldSpec::new("surname", FieldType::Text, 30, 30),
    FieldSpec::new("patronymic", FieldType::Text, 60, 30),
    FieldSpec::new("address", FieldType::Text, 90, 30),
];

const TRANSACTION_FIELDS: [FieldSpec; 4] = [
    FieldSpec::new("counter", FieldType::Integer, 2, 6),
    FieldSpec::new("amount", FieldType::Decimal, 8, 12),
    FieldSpec::new("currency", FieldType::Text, 20, 3),
    FieldSpec::new("reserved", FieldType::Text, 23, 97),
];

const FOOTER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("total_counter", FieldType::Integer, 2, 6),
    FieldSpec::new("control_sum", FieldType::Decimal, 8, 12),
    FieldSpec::new("reserved", FieldType::Text, 20, 100),
];

/// The three record kinds of a batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Header,
    Transaction,
    Footer,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Header,
        RecordKind::Transaction,
        RecordKind::Footer,
    ];

    /// Two-character line prefix identifying the kind.
    pub fn tag(self) -> &'static str {
        match self {
            RecordKind::Header => "01",
            RecordKind::Transaction => "02",
            RecordKind::Footer => "03",
        }
    }

    /// Name used on the command line and in the lock configuration.
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Header => "header",
            RecordKind::Transaction => "transaction",
            RecordKind::Footer => "footer",
        }
    }

    /// Field layout in line order, tag excluded.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            RecordKind::Header => &HEADER_FIELDS,
            RecordKind::Transaction => &TRANSACTION_FIELDS,
            RecordKind::Footer => &FOOTER_FIELDS,
        }
    }

    /// Looks up a field in the schema table.
    pub fn field(self, name: &str) -> Result<&'static FieldSpec, ValidationError> {
        self.fields()
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ValidationError::UnknownField {
                kind: self,
                field: name.to_string(),
            })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

/// Currencies a batch may be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Pln,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Pln];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Pln => "PLN",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ValidationError::InvalidCurrency {
                currency: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_cover_full_line() {
        for kind in RecordKind::ALL {
            let mut expected_offset = TAG_WIDTH;
            for spec in kind.fields() {
                assert_eq!(spec.offset, expected_offset, "{kind}.{}", spec.name);
                expected_offset = spec.end();
            }
            assert_eq!(expected_offset, LINE_WIDTH, "{kind} layout");
        }
    }

    #[test]
    fn test_field_lookup() {
        let spec = RecordKind::Footer.field("control_sum").unwrap();
        assert_eq!(spec.field_type, FieldType::Decimal);
        assert_eq!(spec.width, 12);

        let err = RecordKind::Header.field("amount").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn test_record_kind_from_str() {
        assert_eq!("transaction".parse::<RecordKind>(), Ok(RecordKind::Transaction));
        assert_eq!(" footer ".parse::<RecordKind>(), Ok(RecordKind::Footer));
        assert!("trailer".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_currency_allowed_set() {
        assert_eq!("PLN".parse::<Currency>(), Ok(Currency::Pln));
        assert_eq!(
            "XYZ".parse::<Currency>(),
            Err(ValidationError::InvalidCurrency {
                currency: "XYZ".to_string()
            })
        );
        assert!("usd".parse::<Currency>().is_err());
    }
}
