//! Error types for the batch editor.

use crate::schema::RecordKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for session and command operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// A field or file-shape violation detected by the validators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value could not be read as the declared semantic type
    #[error("Expected {expected}, got '{value}': {reason}")]
    Type {
        expected: &'static str,
        value: String,
        reason: String,
    },

    /// Numeric value below zero
    #[error("Expected {expected}, got '{value}': the numbers cannot be negative")]
    Negative { expected: &'static str, value: String },

    /// Formatted value does not fit its column
    #[error("Formatted value '{formatted}' exceeds maximum width of {width}.")]
    Width { formatted: String, width: usize },

    #[error("Unknown field '{field}' for {kind}")]
    UnknownField { kind: RecordKind, field: String },

    #[error("Missing field '{field}' for {kind}")]
    MissingField { kind: RecordKind, field: String },

    /// Field is maintained by the system and cannot be set directly
    #[error("Field '{field}' in {kind} is derived and cannot be edited")]
    DerivedField { kind: RecordKind, field: String },

    #[error("Field ID for {kind} must be '{expected}'.")]
    Tag { kind: RecordKind, expected: &'static str },

    #[error("File must contain at least one header, one transaction, and one footer.")]
    TooFewLines { found: usize },

    #[error("Each line must be exactly 120 characters long (line {line} has {length}).")]
    LineLength { line: usize, length: usize },

    #[error("File must start with a header and end with a footer.")]
    Boundary,

    #[error("Each transaction must start with 02 id (line {line}).")]
    InteriorTag { line: usize },

    #[error("The number of transaction records must be between 1 and 20,000 (found {count}).")]
    TransactionCount { count: usize },

    #[error("Duplicate transaction counter {counter}")]
    DuplicateCounter { counter: String },

    #[error("Invalid currency in the first transaction: '{currency}'")]
    InvalidCurrency { currency: String },

    #[error("Currency mismatch found: {found} does not match {expected}")]
    CurrencyMismatch { found: String, expected: String },
}

/// A validation failure raised while building one record kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error creating {kind}: {source}")]
pub struct FactoryError {
    pub kind: RecordKind,
    #[source]
    pub source: ValidationError,
}

/// File-level failure while loading a batch.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Error validating file: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while persisting a batch.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Error writing file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while reading or writing the lock configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access lock configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid lock configuration {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the file session and the command layer.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Failed to read commands or write output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file found at the specified path: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No file loaded or file load failed.")]
    NotLoaded,

    #[error("Invalid record type specified: '{0}'")]
    UnknownRecordType(String),

    #[error("Counter value is required for transactions.")]
    MissingCounter,

    #[error("No transaction found with counter {0}.")]
    TransactionNotFound(String),

    #[error("Field '{field}' in '{kind}' is locked and cannot be modified.")]
    FieldLocked { kind: RecordKind, field: String },
}
