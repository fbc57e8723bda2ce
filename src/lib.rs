//! # Batch Editor
//!
//! Loads, validates, edits and saves fixed-width financial batch files: one
//! header record (`01`), 1 to 20000 transaction records (`02`) in a single
//! currency, and one footer record (`03`) carrying the transaction count and
//! control sum.
//!
//! ## Design Principles
//!
//! - **Byte-exact layout**: every line is 120 characters; fields are stored in
//!   their formatted fixed-width form
//! - **Atomic operations**: a failed load leaves no batch, a failed edit
//!   leaves records and footer untouched
//! - **Fixed-point arithmetic**: amounts use 2 decimal places via `rust_decimal`
//! - **Footer consistency**: count and control sum follow every mutation
//!
//! ## Example
//!
//! ```no_run
//! use batch_editor::{FileSession, NoLocks, RecordKind};
//!
//! let mut session = FileSession::new("batch.txt");
//! session.read_file().unwrap();
//! session.add_transaction("50.00").unwrap();
//! session
//!     .set_field(&NoLocks, RecordKind::Header, "name", "Jane", None)
//!     .unwrap();
//! session.save_file().unwrap();
//! ```

pub mod decimal;
pub mod error;
pub mod factory;
pub mod lock;
pub mod record;
pub mod schema;
pub mod session;
pub mod shell;
pub mod structure;
pub mod validator;

pub use decimal::Amount;
pub use error::{
    BatchError, ConfigError, FactoryError, FormatError, Result, SaveError, ValidationError,
};
pub use lock::{LockConfig, LockPolicy, NoLocks};
pub use record::{Footer, Header, Record, Transaction};
pub use schema::{Currency, FieldSpec, FieldType, RecordKind};
pub use session::{Batch, FileSession};
pub use shell::{Flow, Shell};
pub use validator::FieldValue;
