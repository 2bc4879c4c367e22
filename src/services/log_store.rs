//! JSON response log store
//!
//! The log is one pretty-printed JSON array of records. Every append reads the
//! whole array, adds the new records at the end and replaces the file through
//! a temporary sibling and a rename.
//!
//! One writer per log file is assumed; there is no cross-process locking.

use crate::config::{CorruptionPolicy, StoreConfig};
use crate::models::ResponseRecord;
use crate::utils::error::{
    helpers::{read_failed, write_failed},
    StoreError, StoreResult,
};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

/// Result of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReport {
    /// Records added by this call
    pub appended: usize,
    /// Records in the log after this call
    pub total: usize,
    /// Where a corrupted log was moved before the log was reset
    pub backup_path: Option<PathBuf>,
}

/// Existing file state as seen by a read
enum Existing {
    Missing,
    Records(Vec<ResponseRecord>),
    Corrupted(String),
}

/// Append-only JSON log of response records
#[derive(Debug, Clone)]
pub struct JsonLogStore {
    path: PathBuf,
    policy: CorruptionPolicy,
}

impl JsonLogStore {
    /// Create a store for the given file with the default corruption policy
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: CorruptionPolicy::default(),
        }
    }

    /// Create a store from configuration
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone()).with_policy(config.corruption_policy)
    }

    /// Set corruption policy
    pub fn with_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Corruption policy in effect
    pub fn policy(&self) -> CorruptionPolicy {
        self.policy
    }

    /// Read all records
    ///
    /// A missing file reads as an empty log. A corrupted file is always an
    /// error here, whatever the policy, since reads never move files.
    pub fn load(&self) -> StoreResult<Vec<ResponseRecord>> {
        match self.read_existing()? {
            Existing::Missing => Ok(Vec::new()),
            Existing::Records(records) => Ok(records),
            Existing::Corrupted(reason) => Err(StoreError::CorruptedLog {
                path: self.path.clone(),
                reason,
            }),
        }
    }

    /// Append records after the existing ones and rewrite the file
    ///
    /// An empty slice writes nothing; its report still carries the current
    /// record count, so an unreadable or corrupted log is an error here too.
    ///
    /// On error the log file is left as it was, except for
    /// [`StoreError::RestoreFailed`], which names where a corrupted log was moved.
    pub fn append(&self, records: &[ResponseRecord]) -> StoreResult<AppendReport> {
        self.append_with(records, persist)
    }

    fn append_with<F>(&self, records: &[ResponseRecord], commit: F) -> StoreResult<AppendReport>
    where
        F: FnOnce(NamedTempFile, &Path) -> io::Result<()>,
    {
        if records.is_empty() {
            let total = self.load()?.len();
            debug!("Nothing to append to {}", self.path.display());
            return Ok(AppendReport {
                appended: 0,
                total,
                backup_path: None,
            });
        }

        let (mut merged, corruption) = match self.read_existing()? {
            Existing::Missing => (Vec::new(), None),
            Existing::Records(existing) => (existing, None),
            Existing::Corrupted(reason) => match self.policy {
                CorruptionPolicy::Fail => {
                    return Err(StoreError::CorruptedLog {
                        path: self.path.clone(),
                        reason,
                    })
                }
                CorruptionPolicy::BackupAndReset => (Vec::new(), Some(reason)),
            },
        };
        merged.extend_from_slice(records);

        // The corrupted log is only moved once its replacement is on disk
        let staged = self.stage(&merged)?;
        let backup_path = if corruption.is_some() {
            Some(self.backup_corrupted()?)
        } else {
            None
        };

        if let Err(e) = commit(staged, &self.path) {
            return Err(match backup_path {
                Some(backup) => self.restore_backup(backup, e),
                None => write_failed(&self.path, e),
            });
        }

        if let (Some(reason), Some(backup)) = (&corruption, &backup_path) {
            warn!(
                "Corrupted log {} ({}), moved to {} and started a new log",
                self.path.display(),
                reason,
                backup.display()
            );
        }

        info!(
            "Appended {} records to {} ({} total)",
            records.len(),
            self.path.display(),
            merged.len()
        );

        Ok(AppendReport {
            appended: records.len(),
            total: merged.len(),
            backup_path,
        })
    }

    fn read_existing(&self) -> StoreResult<Existing> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            // A parent that is a regular file also means there is no log yet
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(Existing::Missing)
            }
            Err(e) => return Err(read_failed(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Existing::Records(Vec::new()));
        }

        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => return Ok(Existing::Corrupted(format!("invalid JSON: {}", e))),
        };

        if !value.is_array() {
            return Ok(Existing::Corrupted("top-level value is not an array".to_string()));
        }

        match serde_json::from_value::<Vec<ResponseRecord>>(value) {
            Ok(records) => Ok(Existing::Records(records)),
            Err(e) => Ok(Existing::Corrupted(format!(
                "entry does not match the record schema: {}",
                e
            ))),
        }
    }

    /// Move the corrupted file to `<name>.corrupt-<timestamp>`, avoiding clobbering
    fn backup_corrupted(&self) -> StoreResult<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log.json".to_string());
        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S");

        let mut candidate = self.path.with_file_name(format!("{}.corrupt-{}", file_name, stamp));
        let mut suffix = 1;
        while candidate.exists() {
            candidate = self
                .path
                .with_file_name(format!("{}.corrupt-{}-{}", file_name, stamp, suffix));
            suffix += 1;
        }

        fs::rename(&self.path, &candidate).map_err(|e| write_failed(&self.path, e))?;
        Ok(candidate)
    }

    /// Put a backed-up log back after the replacement could not be committed
    fn restore_backup(&self, backup: PathBuf, source: io::Error) -> StoreError {
        match fs::rename(&backup, &self.path) {
            Ok(()) => {
                warn!(
                    "Write to {} failed, corrupted log restored: {}",
                    self.path.display(),
                    source
                );
                write_failed(&self.path, source)
            }
            Err(restore) => {
                error!(
                    "Write to {} failed and corrupted log could not be restored from {}: {}",
                    self.path.display(),
                    backup.display(),
                    restore
                );
                StoreError::RestoreFailed {
                    path: self.path.clone(),
                    backup_path: backup,
                    source,
                }
            }
        }
    }

    /// Write the full log to a synced temporary file next to the target
    fn stage(&self, records: &[ResponseRecord]) -> StoreResult<NamedTempFile> {
        let json = serde_json::to_string_pretty(records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| write_failed(&self.path, e))?;

        let mut staged = NamedTempFile::new_in(&dir).map_err(|e| write_failed(&self.path, e))?;
        staged
            .write_all(json.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| write_failed(&self.path, e))?;

        // Keep the mode of the file being replaced
        if let Ok(metadata) = fs::metadata(&self.path) {
            staged
                .as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| write_failed(&self.path, e))?;
        }

        debug!("Staged {} bytes for {}", json.len(), self.path.display());
        Ok(staged)
    }
}

fn persist(staged: NamedTempFile, path: &Path) -> io::Result<()> {
    staged.persist(path).map(|_| ()).map_err(|e| e.error)
}
