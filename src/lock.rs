//! Per-field edit locks.
//!
//! The session consults a [`LockPolicy`] before every field edit. The
//! JSON-backed [`LockConfig`] is the store used by the command shell; it maps
//! record-type names to field-name → locked flags:
//!
//! ```json
//! { "transaction": { "amount": true } }
//! ```

use crate::error::{ConfigError, ValidationError};
use crate::schema::RecordKind;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Decides whether a field may be edited.
pub trait LockPolicy {
    fn is_locked(&self, kind: RecordKind, field: &str) -> bool;
}

/// Policy with every field unlocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocks;

impl LockPolicy for NoLocks {
    fn is_locked(&self, _kind: RecordKind, _field: &str) -> bool {
        false
    }
}

/// Lock flags persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockConfig {
    records: BTreeMap<String, BTreeMap<String, bool>>,
}

impl LockConfig {
    /// Reads the configuration at `path`; a missing file yields an empty one.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Lock configuration file {} not found; proceeding without locks.",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Lock configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Lock configuration saved to {}", path.display());
        Ok(())
    }

    /// Sets the lock flag of a field declared in the schema.
    pub fn set_locked(
        &mut self,
        kind: RecordKind,
        field: &str,
        locked: bool,
    ) -> Result<(), ValidationError> {
        let spec = kind.field(field)?;
        self.records
            .entry(kind.name().to_string())
            .or_default()
            .insert(spec.name.to_string(), locked);
        Ok(())
    }
}

impl LockPolicy for LockConfig {
    fn is_locked(&self, kind: RecordKind, field: &str) -> bool {
        self.records
            .get(kind.name())
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_no_locks() {
        let dir = tempfile::tempdir().unwrap();
        let config = LockConfig::load(&dir.path().join("lock_config.json")).unwrap();
        assert_eq!(config, LockConfig::default());
        assert!(!config.is_locked(RecordKind::Transaction, "amount"));
    }

    #[test]
    fn test_reads_nested_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock_config.json");
        fs::write(
            &path,
            r#"{"header": {"name": true, "surname": false}, "transaction": {"amount": true}}"#,
        )
        .unwrap();

        let config = LockConfig::load(&path).unwrap();
        assert!(config.is_locked(RecordKind::Header, "name"));
        assert!(!config.is_locked(RecordKind::Header, "surname"));
        assert!(config.is_locked(RecordKind::Transaction, "amount"));
        assert!(!config.is_locked(RecordKind::Footer, "reserved"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock_config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            LockConfig::load(&path),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn test_set_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock_config.json");

        let mut config = LockConfig::default();
        config.set_locked(RecordKind::Footer, "reserved", true).unwrap();
        config.save(&path).unwrap();

        let reloaded = LockConfig::load(&path).unwrap();
        assert!(reloaded.is_locked(RecordKind::Footer, "reserved"));

        config.set_locked(RecordKind::Footer, "reserved", false).unwrap();
        assert!(!config.is_locked(RecordKind::Footer, "reserved"));
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        let mut config = LockConfig::default();
        let err = config
            .set_locked(RecordKind::Header, "amount", true)
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }
}
