//! Append-only request log
//!
//! Workers share one `RequestLogger`. Each record is rendered to a complete
//! line first and then written with a single `write_all` while the file mutex
//! is held, so concurrent appends never interleave bytes and none is lost.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::types::{LedgerError, LogRecord};

/// Shared writer for the request log file
#[derive(Debug)]
pub struct RequestLogger {
    path: PathBuf,
    file: Mutex<File>,
    written: AtomicU64,
}

impl RequestLogger {
    /// Open (or create) the log file for appending
    ///
    /// Existing content is kept; new records go after it.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IoError` if the file cannot be opened.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::IoError {
                message: format!("failed to open log '{}': {}", path.display(), e),
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            written: AtomicU64::new(0),
        })
    }

    /// Append one record as a single line
    pub fn append(&self, record: &LogRecord) -> Result<(), LedgerError> {
        let line = format!("{record}\n");

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        drop(file);

        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of records appended through this logger
    pub fn records_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
