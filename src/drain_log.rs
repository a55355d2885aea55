//! Append-only CSV drain log
//!
//! The log holds one header line followed by one line per recording:
//!
//! ```text
//! action,timestamp,ac,energy_total,capacity_total
//! pre,1700000000,0,41250000,80.00
//! post,1700028800,0,40210000,78.00
//! ```
//!
//! The file is only ever appended to. The header is written when the file
//! is empty, while an exclusive `flock(2)` is held, so overlapping
//! invocations cannot both write it.

use crate::aggregate::AggregateSample;
use crate::error::WriteError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Default location of the drain log
pub const DEFAULT_LOG_FILE: &str = "/var/cache/pt/drain.csv";

/// First line of every drain log
pub const HEADER: &str = "action,timestamp,ac,energy_total,capacity_total\n";

/// One line of the drain log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Label for the transition, e.g. `pre`, `post` or `check`
    pub action: String,
    /// Unix time in seconds
    pub timestamp: i64,
    /// Whether AC power was connected
    pub ac_online: bool,
    /// Total battery energy in µWh
    pub total_energy: u64,
    /// Mean capacity percentage, -1 if unknown
    pub total_capacity: f32,
}

impl LogRecord {
    /// Build a record for `action` from an aggregate sample
    pub fn new(action: &str, sample: &AggregateSample) -> Self {
        Self {
            action: action.to_string(),
            timestamp: sample.timestamp,
            ac_online: sample.ac_online,
            total_energy: sample.total_energy,
            total_capacity: sample.total_capacity,
        }
    }

    /// Check that the action keeps the record on one CSV line.
    ///
    /// Stricter than a plain `printf` of the label: an empty action, or
    /// one containing `,`, `"`, CR or LF, is rejected with
    /// [`WriteError::InvalidAction`] instead of being written verbatim.
    pub fn validate(&self) -> Result<(), WriteError> {
        if self.action.is_empty()
            || self
                .action
                .contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n'))
        {
            return Err(WriteError::InvalidAction(self.action.clone()));
        }
        Ok(())
    }

    /// The record as a CSV line, including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{:.2}",
            self.action,
            self.timestamp,
            u8::from(self.ac_online),
            self.total_energy,
            self.total_capacity
        )
    }
}

/// Append `record` to the log at `log_path`.
///
/// Creates the containing directory and the file as needed and writes the
/// header if the file is empty. Data is synced to disk before returning.
pub fn append_record(log_path: impl AsRef<Path>, record: &LogRecord) -> Result<(), WriteError> {
    let log_path = log_path.as_ref();
    record.validate()?;

    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        ensure_dir(dir)?;
    }

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_path)
        .map_err(|source| WriteError::OpenFailed {
            path: log_path.to_path_buf(),
            source,
        })?;

    let mut file = lock_exclusive(file).map_err(|source| WriteError::LockFailed {
        path: log_path.to_path_buf(),
        source,
    })?;

    let size = file
        .metadata()
        .map_err(|source| WriteError::OpenFailed {
            path: log_path.to_path_buf(),
            source,
        })?
        .len();

    if size == 0 {
        if let Err(source) = file.write_all(HEADER.as_bytes()) {
            drop(file);
            if let Err(e) = fs::remove_file(log_path) {
                warn!("could not remove {}: {}", log_path.display(), e);
            }
            return Err(WriteError::PartialWrite {
                path: log_path.to_path_buf(),
                source,
            });
        }
        info!("created drain log {}", log_path.display());
    }

    file.write_all(record.to_line().as_bytes())
        .map_err(|source| WriteError::PartialWrite {
            path: log_path.to_path_buf(),
            source,
        })?;

    file.sync_all().map_err(|source| WriteError::CloseFailed {
        path: log_path.to_path_buf(),
        source,
    })?;

    info!("appended `{}` to {}", record, log_path.display());
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), WriteError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(WriteError::DirCreateFailed {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn lock_exclusive(file: File) -> io::Result<nix::fcntl::Flock<File>> {
    use nix::fcntl::{Flock, FlockArg};

    Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| io::Error::from(errno))
}

#[cfg(not(unix))]
fn lock_exclusive(file: File) -> io::Result<File> {
    Ok(file)
}
