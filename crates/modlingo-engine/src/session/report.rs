use chrono::{DateTime, Utc};
use modlingo_core::error::ModlingoError;
use serde::Serialize;
use std::path::PathBuf;

use crate::fs;

/// How one file ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Every selected entry got a result and the file was saved.
    Translated,
    /// The file could not be read or parsed and was left alone.
    Skipped(String),
    /// Nothing in the file needed translation.
    NothingToDo,
    /// Cancelled mid-file. Completed results were saved.
    Cancelled,
    /// Translated, but the result could not be written.
    Failed(String),
}

/// Per-file summary.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Entries picked for translation.
    pub selected: usize,
    /// Entries that got a result (translated or fallback).
    pub translated: usize,
    /// Entries whose source text was kept because translation failed.
    pub fallbacks: usize,
    /// Merged text that could not be written, kept for [`FileReport::save_unsaved`].
    #[serde(skip)]
    pub unsaved: Option<String>,
}

impl FileReport {
    pub(crate) fn new(path: PathBuf, outcome: FileOutcome) -> Self {
        Self {
            path,
            outcome,
            selected: 0,
            translated: 0,
            fallbacks: 0,
            unsaved: None,
        }
    }

    /// Retry writing a result that failed to save. Clears it on success.
    pub fn save_unsaved(&mut self) -> Result<bool, ModlingoError> {
        let Some(text) = self.unsaved.as_deref() else {
            return Ok(false);
        };
        fs::write_with_retry(&self.path, text)?;
        self.unsaved = None;
        if matches!(self.outcome, FileOutcome::Failed(_)) {
            self.outcome = FileOutcome::Translated;
        }
        Ok(true)
    }
}

/// Summary of a whole session run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub files: Vec<FileReport>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn translated_entries(&self) -> usize {
        self.files.iter().map(|f| f.translated).sum()
    }

    /// Files whose results are only held in memory.
    pub fn unsaved(&mut self) -> impl Iterator<Item = &mut FileReport> {
        self.files.iter_mut().filter(|f| f.unsaved.is_some())
    }
}
