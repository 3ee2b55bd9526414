//! Append-only audit trail of generation events.
//!
//! One JSON object per line with the columns `Prompt`, `Summary` and `PII`.
//! Rows are only ever appended: each write opens the file in append mode and
//! emits the whole line in one `write_all`, under a mutex, so concurrent
//! generations sharing a log never lose or interleave rows.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::AuditError;
use crate::pipeline::prompt::{ComposedPrompt, PiiMode};

/// One generation event. The prompt column holds the instruction header
/// only; patient data is not duplicated into the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "Prompt")]
    pub prompt: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "PII")]
    pub pii: PiiMode,
}

impl AuditRecord {
    pub fn new(prompt: &ComposedPrompt, summary: &str) -> Self {
        Self {
            prompt: prompt.header().to_string(),
            summary: summary.to_string(),
            pii: prompt.mode(),
        }
    }
}

/// Durable, ordered log of [`AuditRecord`]s. Share across threads via `Arc`.
pub struct AuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the log (and its directory) on first write.
    /// Returns the number of rows in the log after this one.
    pub fn append(&self, record: &AuditRecord) -> Result<usize, AuditError> {
        let mut line =
            serde_json::to_string(record).map_err(|e| AuditError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| AuditError::LockPoisoned)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;

        // A torn final row must not swallow the start of this one.
        if !ends_with_newline(&mut file)? {
            tracing::warn!(
                path = %self.path.display(),
                "Audit log ends mid-row; starting a new line"
            );
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        let rows = self.row_count()?;
        tracing::debug!(pii = %record.pii, rows, "Appended audit row");
        Ok(rows)
    }

    /// All rows in append order. A log that does not exist yet has no rows.
    pub fn read_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let Some(reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| AuditError::Corrupt {
                line: index + 1,
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn row_count(&self) -> Result<usize, AuditError> {
        let Some(reader) = self.open_reader()? else {
            return Ok(0);
        };

        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn open_reader(&self) -> Result<Option<BufReader<File>>, AuditError> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// True for an empty file or one whose last byte is a newline.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
