//! Append-only measurement log.
//!
//! One line per record:
//! `<ISO-8601 timestamp> - <label>: <elapsed>ms (<status>)`.
//! The file is truncated when the sink is created (or reset) and only
//! appended to afterwards. Appends go through a single async mutex, so
//! concurrent scenarios never interleave partial lines.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

/// Status column of a measurement line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordStatus {
    Code(u16),
    Text(String),
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<u16> for RecordStatus {
    fn from(code: u16) -> Self {
        Self::Code(code)
    }
}

impl From<String> for RecordStatus {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RecordStatus {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub elapsed_ms: f64,
    pub status: RecordStatus,
}

impl MeasurementRecord {
    /// Record stamped with the current time.
    pub fn new(label: impl Into<String>, elapsed_ms: f64, status: impl Into<RecordStatus>) -> Self {
        Self {
            timestamp: Utc::now(),
            label: label.into(),
            elapsed_ms,
            status: status.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{} - {}: {:.3}ms ({})\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.label,
            self.elapsed_ms,
            self.status
        )
    }
}

#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultSink {
    /// Create (or truncate) the log at `path`.
    pub async fn create(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| sink_error(&path, e))?;
        }

        // truncate first; append mode alone would keep the previous run
        File::create(&path)
            .await
            .map_err(|e| sink_error(&path, e))?;
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|e| sink_error(&path, e))?;

        debug!(path = %path.display(), "result sink created");
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Discard everything written so far.
    pub async fn reset(&self) -> ProbeResult<()> {
        let file = self.file.lock().await;
        file.set_len(0).await.map_err(|e| sink_error(&self.path, e))?;
        debug!(path = %self.path.display(), "result sink reset");
        Ok(())
    }

    /// Persist one record; earlier lines are never rewritten.
    pub async fn append(&self, record: &MeasurementRecord) -> ProbeResult<()> {
        let line = record.to_line();
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| sink_error(&self.path, e))?;
        file.flush().await.map_err(|e| sink_error(&self.path, e))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sink_error(path: &Path, err: std::io::Error) -> ProbeError {
    ProbeError::Sink {
        message: format!("{}: {}", path.display(), err),
    }
}
