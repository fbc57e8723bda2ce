//! File session: one batch file loaded into memory.
//!
//! A session starts unloaded. [`FileSession::read_file`] either replaces the
//! in-memory batch with a fully validated one or leaves the session unloaded;
//! a partially built batch is never kept. Edits act on memory only and are
//! persisted by [`FileSession::save_file`].
//!
//! # Footer invariants
//!
//! - `total_counter` equals the number of transaction records
//! - `control_sum` equals the sum of transaction amounts
//!
//! Every mutation computes the new footer on a copy and validates it before
//! anything is committed, so a rejected edit changes nothing.

use crate::decimal::Amount;
use crate::error::{BatchError, FormatError, Result, SaveError, ValidationError};
use crate::factory::{
    create_footer, create_header, create_transaction, parse_footer_data, parse_header_data,
    parse_transaction_data, FieldMap,
};
use crate::lock::LockPolicy;
use crate::record::{Footer, Header, Record, Transaction};
use crate::schema::{Currency, FieldType, RecordKind, MAX_TRANSACTIONS};
use crate::structure::{validate_file_exists, validate_file_structure};
use crate::validator::{validate_field, validate_type, FieldValue};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Width of the transaction counter column.
const COUNTER_WIDTH: usize = 6;

/// Zero-pads a user-supplied transaction counter to the stored form.
pub fn normalize_counter(counter: &str) -> String {
    format!("{:0>width$}", counter.trim(), width = COUNTER_WIDTH)
}

/// A fully validated batch: header, transactions and footer.
#[derive(Debug, Clone)]
pub struct Batch {
    header: Header,
    transactions: Vec<Transaction>,
    footer: Footer,
    currency: Currency,
}

impl Batch {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// File-wide currency, fixed by the first transaction.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Finds a transaction by its stored (zero-padded) counter.
    pub fn transaction(&self, counter: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.counter() == counter)
    }

    /// Writes header, transactions and footer as fixed-width lines.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header.to_fixed_width_string())?;
        for tx in &self.transactions {
            writeln!(writer, "{}", tx.to_fixed_width_string())?;
        }
        writeln!(writer, "{}", self.footer.to_fixed_width_string())?;
        writer.flush()
    }

    /// The batch as fixed-width text, one record per line.
    pub fn render(&self) -> String {
        let mut out = self.header.to_fixed_width_string();
        out.push('\n');
        for tx in &self.transactions {
            out.push_str(&tx.to_fixed_width_string());
            out.push('\n');
        }
        out.push_str(&self.footer.to_fixed_width_string());
        out.push('\n');
        out
    }

    /// Footer after adding one transaction of `amount`, validated but not applied.
    fn footer_with_added(&self, amount: Amount) -> std::result::Result<Footer, ValidationError> {
        let total_counter = self.footer.total_counter_value()? + 1;
        let control_sum = self.footer.control_sum_value()? + amount;
        debug!(
            "Updating footer: new total_counter={}, new control_sum={}",
            total_counter, control_sum
        );

        let mut footer = self.footer.clone();
        validate_field(&mut footer, "control_sum", control_sum)?;
        validate_field(&mut footer, "total_counter", total_counter)?;
        Ok(footer)
    }

    fn next_counter(&self) -> std::result::Result<i64, ValidationError> {
        let mut highest = 0;
        for tx in &self.transactions {
            highest = highest.max(tx.counter_value()?);
        }
        Ok(highest + 1)
    }
}

/// Reads and validates the file-wide currency from a transaction line.
fn determine_currency(line: &str) -> std::result::Result<Currency, ValidationError> {
    let data = parse_transaction_data(line)?;
    let code = data.get("currency").map(String::as_str).unwrap_or_default();
    let currency = code.parse::<Currency>()?;
    debug!("Currency set to {} for all transactions.", currency);
    Ok(currency)
}

/// Load/edit/save state for one batch file.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    batch: Option<Batch>,
}

impl FileSession {
    /// Creates an unloaded session for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("FileSession initialized for file: {}", path.display());
        FileSession { path, batch: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.batch.is_some()
    }

    /// The loaded batch, if any.
    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    /// Loads and validates the file, replacing any previously loaded batch.
    ///
    /// On failure the session is left unloaded.
    pub fn read_file(&mut self) -> Result<()> {
        if self.batch.take().is_some() {
            debug!("Discarding previously loaded batch");
        }

        match self.load_batch() {
            Ok(batch) => {
                info!(
                    "File {} loaded: {} transactions in {}",
                    self.path.display(),
                    batch.transactions.len(),
                    batch.currency
                );
                self.batch = Some(batch);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load {}: {}", self.path.display(), e);
                Err(e)
            }
        }
    }

    fn load_batch(&self) -> Result<Batch> {
        validate_file_exists(&self.path)?;

        debug!("Opening file: {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(FormatError::from)?;
        let lines: Vec<&str> = content.lines().collect();

        let currency = lines
            .get(1)
            .map(|line| determine_currency(line))
            .transpose()
            .map_err(FormatError::from)?;

        validate_file_structure(&lines).map_err(FormatError::from)?;
        let currency = currency.ok_or(FormatError::Invalid(ValidationError::TooFewLines {
            found: lines.len(),
        }))?;

        let header_data = parse_header_data(lines[0]).map_err(FormatError::from)?;
        let header = create_header(&header_data)?;

        let interior = &lines[1..lines.len() - 1];
        let mut transactions = Vec::with_capacity(interior.len());
        let mut seen = HashSet::with_capacity(interior.len());
        for line in interior {
            let data = parse_transaction_data(line).map_err(FormatError::from)?;
            check_currency(&data, currency).map_err(FormatError::from)?;
            let tx = create_transaction(&data)?;
            if !seen.insert(tx.counter().to_string()) {
                return Err(FormatError::Invalid(ValidationError::DuplicateCounter {
                    counter: tx.counter().to_string(),
                })
                .into());
            }
            transactions.push(tx);
        }

        let footer_data = parse_footer_data(lines[lines.len() - 1]).map_err(FormatError::from)?;
        let footer = create_footer(&footer_data)?;

        let batch = Batch {
            header,
            transactions,
            footer,
            currency,
        };
        warn_on_footer_drift(&batch);
        Ok(batch)
    }

    /// Returns the stored value of a field.
    ///
    /// `Ok(None)` means the record exists but has no such field. For
    /// transactions `counter` is required and is zero-padded before lookup.
    pub fn get_field_value(
        &self,
        kind: RecordKind,
        field: &str,
        counter: Option<&str>,
    ) -> Result<Option<&str>> {
        let batch = self.batch.as_ref().ok_or_else(|| {
            error!("Attempted to access fields before the file was loaded.");
            BatchError::NotLoaded
        })?;
        debug!(
            "Retrieving field value: record_type={}, field_name={}, counter_value={:?}",
            kind, field, counter
        );

        match kind {
            RecordKind::Header => Ok(batch.header.get(field)),
            RecordKind::Footer => Ok(batch.footer.get(field)),
            RecordKind::Transaction => {
                let counter = normalize_counter(counter.ok_or(BatchError::MissingCounter)?);
                let tx = batch
                    .transaction(&counter)
                    .ok_or(BatchError::TransactionNotFound(counter))?;
                Ok(tx.get(field))
            }
        }
    }

    /// Adds one transaction of `amount` to the footer totals.
    ///
    /// The footer is left unchanged if either new value fails validation.
    pub fn update_footer(&mut self, amount: Amount) -> Result<()> {
        let batch = self.batch.as_mut().ok_or(BatchError::NotLoaded)?;
        batch.footer = batch.footer_with_added(amount).map_err(|e| {
            error!("Error updating footer: {}", e);
            e
        })?;
        Ok(())
    }

    /// Sets one field of a loaded record, subject to `locks`.
    ///
    /// Transaction `amount` edits recompute the footer control sum; the edit
    /// is rejected without changes if the new sum is invalid. Transaction
    /// `counter` and footer totals are maintained by the session and cannot
    /// be set directly.
    pub fn set_field<L: LockPolicy + ?Sized>(
        &mut self,
        locks: &L,
        kind: RecordKind,
        field: &str,
        value: &str,
        counter: Option<&str>,
    ) -> Result<()> {
        if locks.is_locked(kind, field) {
            warn!("Field '{}' in '{}' is locked", field, kind);
            return Err(BatchError::FieldLocked {
                kind,
                field: field.to_string(),
            });
        }

        let batch = self.batch.as_mut().ok_or(BatchError::NotLoaded)?;
        let spec = kind.field(field)?;

        match (kind, spec.name) {
            (RecordKind::Header, _) => validate_field(&mut batch.header, field, value)?,
            (RecordKind::Footer, "total_counter" | "control_sum") | (RecordKind::Transaction, "counter") => {
                return Err(ValidationError::DerivedField {
                    kind,
                    field: field.to_string(),
                }
                .into());
            }
            (RecordKind::Footer, _) => validate_field(&mut batch.footer, field, value)?,
            (RecordKind::Transaction, name) => {
                let counter = normalize_counter(counter.ok_or(BatchError::MissingCounter)?);
                let idx = batch
                    .transactions
                    .iter()
                    .position(|tx| tx.counter() == counter)
                    .ok_or_else(|| BatchError::TransactionNotFound(counter.clone()))?;

                match name {
                    "amount" => {
                        let tx = &batch.transactions[idx];
                        let old_amount = tx.amount_value()?;
                        let mut edited = tx.clone();
                        validate_field(&mut edited, "amount", value)?;
                        let new_amount = edited.amount_value()?;

                        let control_sum =
                            batch.footer.control_sum_value()? - old_amount + new_amount;
                        let mut footer = batch.footer.clone();
                        validate_field(&mut footer, "control_sum", control_sum)?;

                        batch.transactions[idx] = edited;
                        batch.footer = footer;
                        info!(
                            "Updated amount of transaction {} to {} and recalculated control_sum to {}",
                            counter, new_amount, control_sum
                        );
                    }
                    "currency" => {
                        let currency = value.parse::<Currency>()?;
                        if currency != batch.currency {
                            return Err(ValidationError::CurrencyMismatch {
                                found: currency.to_string(),
                                expected: batch.currency.to_string(),
                            }
                            .into());
                        }
                        validate_field(&mut batch.transactions[idx], name, currency.code())?;
                    }
                    _ => validate_field(&mut batch.transactions[idx], name, value)?,
                }
            }
        }

        info!("Set {}.{} to '{}'", kind, field, value);
        Ok(())
    }

    /// Appends a transaction in the file currency with the next counter and
    /// updates the footer. Nothing changes if any step fails.
    pub fn add_transaction(&mut self, amount: &str) -> Result<&Transaction> {
        let batch = self.batch.as_mut().ok_or(BatchError::NotLoaded)?;

        let accepted = validate_type(&FieldValue::from(amount), FieldType::Decimal)?;
        if batch.transactions.len() >= MAX_TRANSACTIONS {
            return Err(ValidationError::TransactionCount {
                count: batch.transactions.len() + 1,
            }
            .into());
        }

        let data: FieldMap = [
            ("counter", batch.next_counter()?.to_string()),
            ("amount", accepted.to_string()),
            ("currency", batch.currency.code().to_string()),
            ("reserved", String::new()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

        let tx = create_transaction(&data)?;
        let footer = batch.footer_with_added(tx.amount_value()?)?;

        info!(
            "Added transaction {} of {} {}",
            tx.counter(),
            accepted,
            batch.currency
        );
        batch.transactions.push(tx);
        batch.footer = footer;
        let last = batch.transactions.len() - 1;
        Ok(&batch.transactions[last])
    }

    /// Writes the loaded batch back to the session's path.
    pub fn save_file(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    /// Writes the loaded batch to `path`; its directory must already exist.
    pub fn save_as(&self, path: &Path) -> Result<()> {
        let batch = self.batch.as_ref().ok_or(BatchError::NotLoaded)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            error!("Cannot save {}: directory does not exist", path.display());
            return Err(SaveError::MissingDirectory(dir.to_path_buf()).into());
        }

        debug!("Saving file to: {}", path.display());
        let file = File::create(path).map_err(SaveError::from)?;
        batch
            .write_to(BufWriter::new(file))
            .map_err(SaveError::from)?;
        info!("File {} saved successfully.", path.display());
        Ok(())
    }
}

fn check_currency(data: &FieldMap, currency: Currency) -> std::result::Result<(), ValidationError> {
    let found = data.get("currency").map(String::as_str).unwrap_or_default();
    if found != currency.code() {
        let err = ValidationError::CurrencyMismatch {
            found: found.to_string(),
            expected: currency.to_string(),
        };
        error!("{}", err);
        return Err(err);
    }
    Ok(())
}

/// Logs when a loaded footer disagrees with its transactions.
fn warn_on_footer_drift(batch: &Batch) {
    let count = batch.transactions.len() as i64;
    if batch.footer.total_counter_value().ok() != Some(count) {
        warn!(
            "Footer total_counter {} does not match {} transactions",
            batch.footer.total_counter(),
            count
        );
    }

    let sum = batch
        .transactions
        .iter()
        .map(Transaction::amount_value)
        .try_fold(Amount::ZERO, |acc, amount| amount.map(|a| acc + a));
    if sum.ok() != batch.footer.control_sum_value().ok() {
        warn!(
            "Footer control_sum {} does not match transaction amounts",
            batch.footer.control_sum()
        );
    }
}
