//! File-level translation session.
//!
//! A session owns a queue of [`FilePair`]s and walks each one through
//! `Idle -> Loading -> Translating -> Saving -> Idle`, then moves on to the
//! next after a short delay. Cancellation halts the queue in `Cancelled`
//! after the current file's completed results have been saved.
//!
//! Every write of a file goes through the same merge-and-replace path, and
//! autosaves never overlap with each other or with the final save.

mod report;


pub use report::{FileOutcome, FileReport, SessionReport};

use async_trait::async_trait;
use chrono::Utc;
use modlingo_core::{
    cancel::CancellationToken,
    codec,
    config::TranslationConfig,
    document::LocalizationDocument,
    evaluator::{Evaluator, Selection},
    pairing::FilePair,
    traits::Translator,
};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::fs;
use crate::orchestrator::{BatchObserver, BatchOptions, Orchestrator, TranslationTask};

/// Where the session is in the per-file cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    Translating,
    Saving,
    Cancelled,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Translating => "translating",
            Self::Saving => "saving",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Session callbacks, all optional.
///
/// Called from whichever task did the work; observers needing a particular
/// thread must marshal themselves.
pub trait SessionObserver: Send + Sync {
    fn on_state(&self, _state: SessionState) {}

    fn on_file_start(&self, _pair: &FilePair) {}

    fn on_selection(&self, _path: &Path, _selection: &Selection) {}

    /// One entry finished, in completion order.
    fn on_entry(&self, _key: &str, _source: &str, _translated: &str) {}

    fn on_progress(&self, _completed: usize, _total: usize) {}

    /// A partial result covering `saved` entries was written to `path`.
    fn on_autosave(&self, _path: &Path, _saved: usize) {}

    fn on_file_done(&self, _report: &FileReport) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Sequential driver over a queue of files.
pub struct Session {
    orchestrator: Orchestrator,
    evaluator: Evaluator,
    advance_delay: Duration,
    queue: VecDeque<FilePair>,
    state: Mutex<SessionState>,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(translator: Arc<dyn Translator>, cfg: &TranslationConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(translator, BatchOptions::from_config(cfg)),
            evaluator: Evaluator::new(cfg.source_policy()),
            advance_delay: cfg.advance_delay(),
            queue: VecDeque::new(),
            state: Mutex::new(SessionState::Idle),
            cancel: CancellationToken::new(),
        }
    }

    /// Share an existing cancellation token (e.g. one wired to Ctrl-C).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn enqueue(&mut self, pair: FilePair) {
        self.queue.push_back(pair);
    }

    pub fn enqueue_all(&mut self, pairs: impl IntoIterator<Item = FilePair>) {
        self.queue.extend(pairs);
    }

    /// Files not yet started.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState, observer: &dyn SessionObserver) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        observer.on_state(state);
    }

    /// Process queued files until the queue is empty or the session is cancelled.
    pub async fn run(&mut self, observer: &dyn SessionObserver) -> SessionReport {
        let started_at = Utc::now();
        let mut files = Vec::new();
        let mut cancelled = false;

        while let Some(pair) = self.queue.pop_front() {
            if self.cancel.is_cancelled() {
                self.queue.push_front(pair);
                cancelled = true;
                break;
            }

            let report = self.process_file(&pair, observer).await;
            observer.on_file_done(&report);
            let halted = report.outcome == FileOutcome::Cancelled;
            files.push(report);
            if halted {
                cancelled = true;
                break;
            }

            if !self.queue.is_empty() && !self.advance_delay.is_zero() {
                tokio::time::sleep(self.advance_delay).await;
            }
        }

        if cancelled {
            self.set_state(SessionState::Cancelled, observer);
            info!("session: cancelled, {} file(s) left in queue", self.queue.len());
        }

        SessionReport {
            files,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Load, translate and save a single file.
    pub async fn process_file(&self, pair: &FilePair, observer: &dyn SessionObserver) -> FileReport {
        let path = pair.translation_path.as_path();
        observer.on_file_start(pair);
        self.set_state(SessionState::Loading, observer);

        let (raw, document) = match fs::read_document(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("session: skipped {}: {e}", path.display());
                self.set_state(SessionState::Idle, observer);
                return FileReport::new(path.to_path_buf(), FileOutcome::Skipped(e.to_string()));
            }
        };
        let original = pair
            .original_path
            .as_deref()
            .and_then(|p| match fs::read_document(p) {
                Ok((_, doc)) => Some(doc),
                Err(e) => {
                    warn!(
                        "session: original {} unusable, comparing without it: {e}",
                        p.display()
                    );
                    None
                }
            });

        self.set_state(SessionState::Translating, observer);
        let selection = self.evaluator.select(&document, original.as_ref());
        info!(
            "session: {}: {} candidates, {} need translation, {} already translated",
            path.display(),
            selection.candidates,
            selection.entries.len(),
            selection.skipped
        );
        observer.on_selection(path, &selection);

        let mut report = FileReport::new(path.to_path_buf(), FileOutcome::NothingToDo);
        report.selected = selection.entries.len();
        if selection.entries.is_empty() {
            self.set_state(SessionState::Idle, observer);
            return report;
        }

        let (keys, tasks): (Vec<String>, Vec<TranslationTask>) = selection
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| (entry.key, TranslationTask::new(i, entry.source)))
            .unzip();

        let batch = FileBatch {
            session: self,
            path,
            keys: &keys,
            document: &document,
            raw: &raw,
            observer,
        };
        let outcome = self
            .orchestrator
            .translate_batch(tasks, &batch, &self.cancel)
            .await;
        report.translated = outcome.completed();
        report.fallbacks = outcome.fallbacks;

        let finished = if outcome.cancelled {
            SessionState::Cancelled
        } else {
            SessionState::Idle
        };
        let done = if outcome.cancelled {
            FileOutcome::Cancelled
        } else {
            FileOutcome::Translated
        };

        if outcome.results.is_empty() {
            report.outcome = done;
            self.set_state(finished, observer);
            return report;
        }

        self.set_state(SessionState::Saving, observer);
        let text = batch.render(&outcome.results);
        report.outcome = if text == raw {
            done
        } else {
            match fs::write_with_retry(path, &text) {
                Ok(()) => {
                    info!(
                        "session: saved {} ({} entries)",
                        path.display(),
                        outcome.completed()
                    );
                    done
                }
                Err(e) => {
                    error!("session: could not save {}: {e}", path.display());
                    report.unsaved = Some(text);
                    if outcome.cancelled {
                        FileOutcome::Cancelled
                    } else {
                        FileOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        self.set_state(finished, observer);
        report
    }
}

/// Bridges orchestrator callbacks for one file to the session observer.
struct FileBatch<'a> {
    session: &'a Session,
    path: &'a Path,
    keys: &'a [String],
    document: &'a LocalizationDocument,
    raw: &'a str,
    observer: &'a dyn SessionObserver,
}

impl FileBatch<'_> {
    /// The file text with `results` applied on top of the loaded document.
    fn render(&self, results: &BTreeMap<usize, String>) -> String {
        let mut updated = self.document.clone();
        for (index, text) in results {
            if let Some(key) = self.keys.get(*index) {
                updated.set_str(key.clone(), text.clone());
            }
        }
        codec::merge(&updated, self.raw)
    }
}

#[async_trait]
impl<'a> BatchObserver for FileBatch<'a> {
    fn on_result(&self, index: usize, source: &str, translated: &str) {
        if let Some(key) = self.keys.get(index) {
            self.observer.on_entry(key, source, translated);
        }
    }

    fn on_progress(&self, completed: usize, total: usize) {
        self.observer.on_progress(completed, total);
    }

    async fn on_autosave(&self, partial: &BTreeMap<usize, String>) {
        self.session.set_state(SessionState::Saving, self.observer);
        let text = self.render(partial);
        let path = self.path.to_path_buf();
        let written = tokio::task::spawn_blocking(move || fs::write_with_retry(&path, &text)).await;
        match written {
            Ok(Ok(())) => {
                info!(
                    "session: autosaved {} entries to {}",
                    partial.len(),
                    self.path.display()
                );
                self.observer.on_autosave(self.path, partial.len());
            }
            Ok(Err(e)) => warn!("session: autosave of {} failed: {e}", self.path.display()),
            Err(e) => warn!("session: autosave task for {} failed: {e}", self.path.display()),
        }
        self.session.set_state(SessionState::Translating, self.observer);
    }
}
