use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FixError;

// ------------------ EVENTS ------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    Updated,
    NoMatch,
    Failed,
    CheckOk,
    CheckMismatch,
    CheckMissing,
}

impl AuditEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEvent::Updated => "UPDATED",
            AuditEvent::NoMatch => "NO_MATCH",
            AuditEvent::Failed => "FAILED",
            AuditEvent::CheckOk => "CHECK_OK",
            AuditEvent::CheckMismatch => "CHECK_MISMATCH",
            AuditEvent::CheckMissing => "CHECK_MISSING",
        }
    }
}

// ------------------ LOG FILE ------------------

/// Append-only audit trail, one line per event:
/// `timestamp | key | EVENT | detail`
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, key: &str, event: AuditEvent, detail: &str) -> Result<(), FixError> {
        let timestamp = Utc::now().to_rfc3339();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} | {} | {} | {}", timestamp, key, event.as_str(), detail)?;
        Ok(())
    }
}

// Log to the audit file if one is configured. A failed write is reported but never stops a run.
pub fn log_event(log: Option<&AuditLog>, key: &str, event: AuditEvent, detail: &str) {
    if let Some(log) = log {
        if let Err(e) = log.append(key, event, detail) {
            eprintln!("Audit log write to {} failed: {e}", log.path().display());
        }
    }
}
