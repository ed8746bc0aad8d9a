//! Append-only JSONL history storage for result records.
//!
//! Each record is one JSON line, so history can be appended and streamed
//! without loading the whole file into memory.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::BenchError;
use crate::model::{ResultRecord, SCHEMA_VERSION};

#[derive(Debug, Clone)]
pub struct JsonlWriter {
    path: PathBuf,
}

impl JsonlWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonlWriter {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, rejecting a schema version mismatch up front.
    pub fn append(&self, record: &ResultRecord) -> Result<(), BenchError> {
        if record.schema_version != SCHEMA_VERSION {
            return Err(BenchError::Message(format!(
                "schema version mismatch: record has v{}, expected v{}",
                record.schema_version, SCHEMA_VERSION
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(record)
            .map_err(|e| BenchError::Message(format!("failed to serialize record: {e}")))?;

        writeln!(file, "{json}")?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<ResultRecord>, BenchError> {
        self.read_filtered(None)
    }

    /// Read records, optionally filtered by platform tag.
    pub fn read_filtered(
        &self,
        platform_tag: Option<&str>,
    ) -> Result<Vec<ResultRecord>, BenchError> {
        if !self.path.exists() {
            return Err(BenchError::Io(format!(
                "file not found: {}",
                self.path.display()
            )));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ResultRecord = serde_json::from_str(&line).map_err(|e| {
                BenchError::Message(format!("failed to parse line {}: {e}", line_num + 1))
            })?;

            if let Some(tag) = platform_tag {
                if record.platform.platform_tag != tag {
                    continue;
                }
            }
            records.push(record);
        }

        Ok(records)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn count(&self) -> Result<usize, BenchError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(reader
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count())
    }
}
