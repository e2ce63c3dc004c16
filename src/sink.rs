//! Tabular sink: writes a uniform record set to a CSV file.

use crate::error::{SchemaMismatchError, SinkError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A fixed-shape row that can be written to the sink.
pub trait Record {
    /// Column names, in output order.
    fn field_names(&self) -> Vec<&'static str>;

    /// Cell values, aligned with [`Record::field_names`].
    fn values(&self) -> Vec<String>;
}

/// Result of a write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, rows: usize },
    /// The record set was empty; no file was created or touched.
    NothingToWrite,
}

/// Checks that every record shares the first record's field set and order.
pub fn check_uniform<R: Record>(records: &[R]) -> Result<(), SchemaMismatchError> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let expected = first.field_names();

    for (index, record) in records.iter().enumerate().skip(1) {
        let found = record.field_names();
        if found != expected {
            return Err(SchemaMismatchError {
                index,
                expected: expected.iter().map(|s| s.to_string()).collect(),
                found: found.iter().map(|s| s.to_string()).collect(),
            });
        }
    }

    Ok(())
}

/// Writes `records` to `path` with a header row taken from the first record.
///
/// Missing parent directories are created. An existing file is overwritten.
/// Nothing is written when the schema check fails.
pub fn write_records<R: Record>(records: &[R], path: &Path) -> Result<WriteOutcome, SinkError> {
    let Some(first) = records.first() else {
        debug!("No records for {}, skipping write", path.display());
        return Ok(WriteOutcome::NothingToWrite);
    };

    check_uniform(records)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(first.field_names())?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(WriteOutcome::Written { path: path.to_path_buf(), rows: records.len() })
}

/// A CSV file read back as header plus string rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of column `name`, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Reads a file produced by [`write_records`].
pub fn read_table(path: &Path) -> Result<Table, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?.iter().map(String::from).collect());
    }
    Ok(Table { header, rows })
}
