//! JSONL audit journal — append-only log of completed audits.
//!
//! One line per audit with outcome, strategy, and timing. Rotates when the
//! file exceeds `MAX_JOURNAL_SIZE`; rotated files are named `.1`, `.2`, etc.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Maximum journal size before rotation (10 MB).
const MAX_JOURNAL_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated journal files to keep.
const MAX_ROTATIONS: u32 = 3;

/// A single journal entry.
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub url: String,
    pub site: String,
    pub strategy: String,
    pub blocked: bool,
    pub score: Option<f64>,
    pub status: String,
    pub duration_ms: u64,
}

/// Append-only JSONL journal with automatic rotation.
pub struct Journal {
    file: File,
    path: PathBuf,
    /// Approximate current size; re-checked on rotation.
    current_size: u64,
}

impl Journal {
    /// Open or create the journal file.
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open journal: {}", path.display()))?;

        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            file,
            path: path.clone(),
            current_size,
        })
    }

    /// Append an entry.
    pub fn log(&mut self, entry: &JournalEntry) -> Result<()> {
        if self.current_size >= MAX_JOURNAL_SIZE {
            self.rotate()?;
        }

        let json = serde_json::to_string(entry)?;
        writeln!(self.file, "{json}")
            .with_context(|| format!("failed to append to journal: {}", self.path.display()))?;
        self.current_size += json.len() as u64 + 1;
        Ok(())
    }

    /// Build and append an entry stamped with the current time.
    #[allow(clippy::too_many_arguments)]
    pub fn log_audit(
        &mut self,
        url: &str,
        site: &str,
        strategy: &str,
        blocked: bool,
        score: Option<f64>,
        status: &str,
        duration_ms: u64,
    ) -> Result<()> {
        self.log(&JournalEntry {
            timestamp: Utc::now().to_rfc3339(),
            url: url.to_string(),
            site: site.to_string(),
            strategy: strategy.to_string(),
            blocked,
            score,
            status: status.to_string(),
            duration_ms,
        })
    }

    /// Rotate journal files: journal.jsonl → .1, .1 → .2, etc.
    fn rotate(&mut self) -> Result<()> {
        self.file.flush()?;

        for i in (1..MAX_ROTATIONS).rev() {
            let from = rotation_path(&self.path, i);
            let to = rotation_path(&self.path, i + 1);
            if from.exists() {
                let _ = std::fs::rename(&from, &to);
            }
        }
        let _ = std::fs::rename(&self.path, rotation_path(&self.path, 1));

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to reopen journal: {}", self.path.display()))?;
        self.current_size = 0;
        Ok(())
    }
}

fn rotation_path(path: &PathBuf, n: u32) -> PathBuf {
    let mut os = path.clone().into_os_string();
    os.push(format!(".{n}"));
    PathBuf::from(os)
}
