//! Audit Sink
//!
//! Append-only actor/action/detail log, one JSON object per line. The trait
//! is the contract the workflow depends on; the file sink is the local
//! implementation.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Value, json};

/// Append-only audit contract. Implementations must never fail the calling
/// operation: audit write errors are logged and swallowed.
pub trait AuditSink: Send + Sync {
    fn log(&self, actor: &str, action: &str, details: Value);
}

/// JSONL file sink: `{timestamp, actor, action, ...details}` per line.
pub struct FileAuditSink {
    path: PathBuf,
    // Serializes appends from concurrent handlers.
    lock: Mutex<()>,
}

impl FileAuditSink {
    pub fn new(log_dir: &str, audit_file: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(log_dir)?;
        Ok(Self {
            path: PathBuf::from(log_dir).join(audit_file),
            lock: Mutex::new(()),
        })
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }
}

impl AuditSink for FileAuditSink {
    fn log(&self, actor: &str, action: &str, details: Value) {
        let mut entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "actor": actor,
            "action": action,
        });
        if let (Some(map), Value::Object(extra)) = (entry.as_object_mut(), details) {
            for (k, v) in extra {
                map.insert(k, v);
            }
        }
        let line = entry.to_string();
        if let Err(e) = self.append(&line) {
            tracing::error!("Audit write failed: {}", e);
        }
        tracing::info!(actor = actor, action = action, "audit");
    }
}
