//! File-shape checks applied to the raw lines before any record is built.

use crate::error::{BatchError, Result, ValidationError};
use crate::schema::{RecordKind, LINE_WIDTH, MAX_TRANSACTIONS, MIN_TRANSACTIONS};
use log::{debug, error, info};
use std::path::Path;

/// Validates line count, line length, record ordering and transaction count.
///
/// Checks run in a fixed order and the first violation is returned:
/// 1. at least 3 lines
/// 2. every line exactly [`LINE_WIDTH`] characters (terminators ignored)
/// 3. first line tagged `01`, last line tagged `03`
/// 4. every interior line tagged `02`
/// 5. interior line count within bounds
pub fn validate_file_structure<S: AsRef<str>>(lines: &[S]) -> std::result::Result<(), ValidationError> {
    debug!("validate_file_structure over {} lines", lines.len());

    if lines.len() < 3 {
        let err = ValidationError::TooFewLines { found: lines.len() };
        error!("{}", err);
        return Err(err);
    }

    for (idx, line) in lines.iter().enumerate() {
        let length = line.as_ref().trim_end_matches(['\r', '\n']).chars().count();
        if length != LINE_WIDTH {
            let err = ValidationError::LineLength {
                line: idx + 1,
                length,
            };
            error!("{}", err);
            return Err(err);
        }
    }

    let first = lines[0].as_ref();
    let last = lines[lines.len() - 1].as_ref();
    if !first.starts_with(RecordKind::Header.tag()) || !last.starts_with(RecordKind::Footer.tag()) {
        error!("{}", ValidationError::Boundary);
        return Err(ValidationError::Boundary);
    }

    let interior = &lines[1..lines.len() - 1];
    if let Some(idx) = interior
        .iter()
        .position(|line| !line.as_ref().starts_with(RecordKind::Transaction.tag()))
    {
        let err = ValidationError::InteriorTag { line: idx + 2 };
        error!("{}", err);
        return Err(err);
    }

    if !(MIN_TRANSACTIONS..=MAX_TRANSACTIONS).contains(&interior.len()) {
        let err = ValidationError::TransactionCount {
            count: interior.len(),
        };
        error!("{}", err);
        return Err(err);
    }

    info!("File structure validated successfully.");
    Ok(())
}

/// Fails with [`BatchError::NotFound`] unless `path` is an existing file.
pub fn validate_file_exists(path: &Path) -> Result<()> {
    debug!("validate_file_exists {}", path.display());
    if !path.is_file() {
        error!("No file found at the specified path: {}", path.display());
        return Err(BatchError::NotFound(path.to_path_buf()));
    }
    Ok(())
}
