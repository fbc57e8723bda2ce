//! Parsing fixed-width lines into field maps and building validated records.
//!
//! Parsing only slices a line by the schema offsets and checks the tag;
//! construction runs the full field validation and wraps any failure in a
//! [`FactoryError`] naming the record kind.

use crate::error::{FactoryError, ValidationError};
use crate::record::{Footer, Header, Record, Transaction};
use crate::schema::{RecordKind, TAG_WIDTH};
use crate::validator::validate_record;
use log::{debug, error, info};
use std::collections::BTreeMap;

/// Raw field values keyed by field name.
pub type FieldMap = BTreeMap<String, String>;

/// Characters `start..end` of `line`, or fewer if the line is short.
fn slice_chars(line: &str, start: usize, end: usize) -> &str {
    let byte_at = |n: usize| {
        line.char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(line.len())
    };
    &line[byte_at(start)..byte_at(end)]
}

/// Slices `line` into trimmed field values for `kind`.
pub fn parse_record_data(kind: RecordKind, line: &str) -> Result<FieldMap, ValidationError> {
    if slice_chars(line, 0, TAG_WIDTH).trim() != kind.tag() {
        let err = ValidationError::Tag {
            kind,
            expected: kind.tag(),
        };
        error!("{}", err);
        return Err(err);
    }

    Ok(kind
        .fields()
        .iter()
        .map(|spec| {
            let raw = slice_chars(line, spec.offset, spec.end()).trim();
            (spec.name.to_string(), raw.to_string())
        })
        .collect())
}

pub fn parse_header_data(line: &str) -> Result<FieldMap, ValidationError> {
    parse_record_data(RecordKind::Header, line)
}

pub fn parse_transaction_data(line: &str) -> Result<FieldMap, ValidationError> {
    parse_record_data(RecordKind::Transaction, line)
}

pub fn parse_footer_data(line: &str) -> Result<FieldMap, ValidationError> {
    parse_record_data(RecordKind::Footer, line)
}

/// Fills `record` from `data` and validates every field.
fn populate<R: Record>(mut record: R, data: &FieldMap) -> Result<R, ValidationError> {
    for name in data.keys() {
        R::KIND.field(name)?;
    }
    for spec in R::KIND.fields() {
        let value = data.get(spec.name).ok_or_else(|| ValidationError::MissingField {
            kind: R::KIND,
            field: spec.name.to_string(),
        })?;
        if let Some(slot) = record.slot_mut(spec.name) {
            slot.clone_from(value);
        }
    }
    validate_record(&mut record)?;
    Ok(record)
}

fn create<R: Record>(blank: R, data: &FieldMap) -> Result<R, FactoryError> {
    debug!("Attempting to create {} with data: {:?}", R::KIND, data);
    match populate(blank, data) {
        Ok(record) => {
            info!("{} created successfully", R::KIND);
            Ok(record)
        }
        Err(source) => {
            let err = FactoryError {
                kind: R::KIND,
                source,
            };
            error!("{}", err);
            Err(err)
        }
    }
}

pub fn create_header(data: &FieldMap) -> Result<Header, FactoryError> {
    create(Header::blank(), data)
}

pub fn create_transaction(data: &FieldMap) -> Result<Transaction, FactoryError> {
    create(Transaction::blank(), data)
}

pub fn create_footer(data: &FieldMap) -> Result<Footer, FactoryError> {
    create(Footer::blank(), data)
}
