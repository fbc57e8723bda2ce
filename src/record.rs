//! Header, transaction and footer records.
//!
//! Records store every field in its fixed-width formatted form. The record
//! tag is an associated constant of each type and cannot be changed.

use crate::decimal::Amount;
use crate::error::ValidationError;
use crate::schema::{FieldType, RecordKind, LINE_WIDTH};
use std::str::FromStr;

pub(crate) mod sealed {
    /// Write access to field storage, reserved for the validator.
    pub trait FieldSlots {
        fn slot_mut(&mut self, field: &str) -> Option<&mut String>;
    }
}

/// Common behaviour of the three record kinds.
pub trait Record: sealed::FieldSlots {
    /// Kind of this record; determines tag and field layout.
    const KIND: RecordKind;

    /// Two-character line prefix.
    fn tag(&self) -> &'static str {
        Self::KIND.tag()
    }

    /// Returns the stored value of a field, or `None` if the field is not in
    /// this record's layout.
    fn get(&self, field: &str) -> Option<&str>;

    /// Renders the record as one fixed-width line without terminator.
    fn to_fixed_width_string(&self) -> String {
        let mut line = String::with_capacity(LINE_WIDTH);
        line.push_str(self.tag());
        for spec in Self::KIND.fields() {
            line.push_str(self.get(spec.name).unwrap_or_default());
        }
        line
    }
}

fn read_integer(raw: &str) -> Result<i64, ValidationError> {
    i64::from_str(raw.trim()).map_err(|e| ValidationError::Type {
        expected: FieldType::Integer.name(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn read_amount(raw: &str) -> Result<Amount, ValidationError> {
    Amount::from_str(raw).map_err(|e| ValidationError::Type {
        expected: FieldType::Decimal.name(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Record `01`: identification of the batch owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    surname: String,
    patronymic: String,
    address: String,
}

impl Header {
    pub(crate) fn blank() -> Self {
        Header {
            name: String::new(),
            surname: String::new(),
            patronymic: String::new(),
            address: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn patronymic(&self) -> &str {
        &self.patronymic
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Record for Header {
    const KIND: RecordKind = RecordKind::Header;

    fn get(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(&self.name),
            "surname" => Some(&self.surname),
            "patronymic" => Some(&self.patronymic),
            "address" => Some(&self.address),
            _ => None,
        }
    }
}

impl sealed::FieldSlots for Header {
    fn slot_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name" => Some(&mut self.name),
            "surname" => Some(&mut self.surname),
            "patronymic" => Some(&mut self.patronymic),
            "address" => Some(&mut self.address),
            _ => None,
        }
    }
}

/// Record `02`: a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    counter: String,
    amount: String,
    currency: String,
    reserved: String,
}

impl Transaction {
    pub(crate) fn blank() -> Self {
        Transaction {
            counter: String::new(),
            amount: String::new(),
            currency: String::new(),
            reserved: String::new(),
        }
    }

    /// Six-digit zero-padded sequence number.
    pub fn counter(&self) -> &str {
        &self.counter
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn counter_value(&self) -> Result<i64, ValidationError> {
        read_integer(&self.counter)
    }

    pub fn amount_value(&self) -> Result<Amount, ValidationError> {
        read_amount(&self.amount)
    }
}

impl Record for Transaction {
    const KIND: RecordKind = RecordKind::Transaction;

    fn get(&self, field: &str) -> Option<&str> {
        match field {
            "counter" => Some(&self.counter),
            "amount" => Some(&self.amount),
            "currency" => Some(&self.currency),
            "reserved" => Some(&self.reserved),
            _ => None,
        }
    }
}

impl sealed::FieldSlots for Transaction {
    fn slot_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "counter" => Some(&mut self.counter),
            "amount" => Some(&mut self.amount),
            "currency" => Some(&mut self.currency),
            "reserved" => Some(&mut self.reserved),
            _ => None,
        }
    }
}

/// Record `03`: transaction count and control sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    total_counter: String,
    control_sum: String,
    reserved: String,
}

impl Footer {
    pub(crate) fn blank() -> Self {
        Footer {
            total_counter: String::new(),
            control_sum: String::new(),
            reserved: String::new(),
        }
    }

    pub fn total_counter(&self) -> &str {
        &self.total_counter
    }

    pub fn control_sum(&self) -> &str {
        &self.control_sum
    }

    pub fn total_counter_value(&self) -> Result<i64, ValidationError> {
        read_integer(&self.total_counter)
    }

    pub fn control_sum_value(&self) -> Result<Amount, ValidationError> {
        read_amount(&self.control_sum)
    }
}

impl Record for Footer {
    const KIND: RecordKind = RecordKind::Footer;

    fn get(&self, field: &str) -> Option<&str> {
        match field {
            "total_counter" => Some(&self.total_counter),
            "control_sum" => Some(&self.control_sum),
            "reserved" => Some(&self.reserved),
            _ => None,
        }
    }
}

impl sealed::FieldSlots for Footer {
    fn slot_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "total_counter" => Some(&mut self.total_counter),
            "control_sum" => Some(&mut self.control_sum),
            "reserved" => Some(&mut self.reserved),
            _ => None,
        }
    }
}
