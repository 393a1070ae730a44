//! Bounded-concurrency batch translation.
//!
//! A batch runs `min(concurrency, tasks)` workers that pull tasks from a
//! shared queue, so no more calls are ever in flight than that. Results are
//! reported in completion order. A failed, timed-out or placeholder-breaking
//! translation, or a reply that only echoes the source, is replaced by its
//! source text and still counts as completed.
//!
//! All job bookkeeping (results, counters, the cancelled flag) lives behind a
//! single mutex. Autosaves are serialized through a separate async gate and
//! never write an older snapshot over a newer one.

use async_trait::async_trait;
use futures_util::future::join_all;
use modlingo_core::{
    cancel::CancellationToken, config::TranslationConfig, error::ModlingoError,
    placeholder::check_placeholders, traits::Translator,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};


/// One unit of work. `index` maps the result back to its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTask {
    pub index: usize,
    pub source: String,
}

impl TranslationTask {
    pub fn new(index: usize, source: impl Into<String>) -> Self {
        Self {
            index,
            source: source.into(),
        }
    }
}

/// Knobs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub target_language: String,
    pub concurrency: usize,
    pub autosave_every: usize,
    pub call_timeout: Duration,
}

impl BatchOptions {
    pub fn from_config(cfg: &TranslationConfig) -> Self {
        Self {
            target_language: cfg.target_language.clone(),
            concurrency: cfg.concurrency(),
            autosave_every: cfg.autosave_every(),
            call_timeout: cfg.call_timeout(),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}

/// Callbacks fired while a batch runs.
///
/// `on_result` and `on_progress` run on whichever worker completed the unit,
/// while the job lock is held; keep them short.
#[async_trait]
pub trait BatchObserver: Send + Sync {
    fn on_result(&self, _index: usize, _source: &str, _translated: &str) {}

    fn on_progress(&self, _completed: usize, _total: usize) {}

    /// Persist a snapshot of every result so far. Calls never overlap.
    async fn on_autosave(&self, _partial: &BTreeMap<usize, String>) {}
}

/// Observer that ignores everything.
pub struct NoopBatchObserver;

impl BatchObserver for NoopBatchObserver {}

/// What a batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Result text per task index. Complete unless `cancelled`.
    pub results: BTreeMap<usize, String>,
    pub total: usize,
    /// Tasks whose source text was kept because translation failed.
    pub fallbacks: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn completed(&self) -> usize {
        self.results.len()
    }
}

/// Mutable state of one in-flight batch.
#[derive(Debug)]
struct TranslationJob {
    total: usize,
    completed: usize,
    cancelled: bool,
    results: BTreeMap<usize, String>,
    fallbacks: usize,
    since_autosave: usize,
}

impl TranslationJob {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            cancelled: false,
            results: BTreeMap::new(),
            fallbacks: 0,
            since_autosave: 0,
        }
    }

    fn record(&mut self, index: usize, text: String, fell_back: bool) {
        if self.results.insert(index, text).is_none() {
            self.completed += 1;
            self.since_autosave += 1;
        }
        if fell_back {
            self.fallbacks += 1;
        }
    }

    /// Mark the job cancelled if the token fired before every task finished.
    fn observe_cancel(&mut self, cancel: &CancellationToken) {
        if cancel.is_cancelled() && self.completed < self.total {
            self.cancelled = true;
        }
    }

    /// Snapshot of the results when the autosave interval is reached.
    fn take_autosave(&mut self, every: usize) -> Option<BTreeMap<usize, String>> {
        if self.cancelled || self.since_autosave < every {
            return None;
        }
        self.since_autosave = 0;
        Some(self.results.clone())
    }

    fn into_outcome(self) -> BatchOutcome {
        BatchOutcome {
            results: self.results,
            total: self.total,
            fallbacks: self.fallbacks,
            cancelled: self.cancelled,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared by the workers of one batch.
struct BatchRun<'a> {
    queue: Mutex<VecDeque<TranslationTask>>,
    job: Mutex<TranslationJob>,
    /// Size of the last snapshot handed to `on_autosave`.
    saved: tokio::sync::Mutex<usize>,
    observer: &'a dyn BatchObserver,
    cancel: &'a CancellationToken,
}

/// Runs batches against one translator.
pub struct Orchestrator {
    translator: Arc<dyn Translator>,
    options: BatchOptions,
}

impl Orchestrator {
    pub fn new(translator: Arc<dyn Translator>, options: BatchOptions) -> Self {
        Self {
            translator,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Translate every task, or as many as finish before `cancel` is observed.
    ///
    /// Never fails: per-task errors become source-text fallbacks and
    /// cancellation returns the partial mapping with `cancelled` set.
    pub async fn translate_batch(
        &self,
        tasks: Vec<TranslationTask>,
        observer: &dyn BatchObserver,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let total = tasks.len();
        if total == 0 {
            return BatchOutcome::default();
        }

        let workers = self.options.concurrency.max(1).min(total);
        info!(
            "orchestrator: {total} tasks, {workers} workers, lang={}",
            self.options.target_language
        );

        let run = BatchRun {
            queue: Mutex::new(VecDeque::from(tasks)),
            job: Mutex::new(TranslationJob::new(total)),
            saved: tokio::sync::Mutex::new(0),
            observer,
            cancel,
        };

        join_all((0..workers).map(|id| self.worker(id, &run))).await;

        let mut job = run.job.into_inner().unwrap_or_else(PoisonError::into_inner);
        job.observe_cancel(cancel);
        let outcome = job.into_outcome();
        info!(
            "orchestrator: {}/{} completed, {} fallbacks{}",
            outcome.completed(),
            outcome.total,
            outcome.fallbacks,
            if outcome.cancelled { ", cancelled" } else { "" }
        );
        outcome
    }

    async fn worker(&self, id: usize, run: &BatchRun<'_>) {
        loop {
            if run.cancel.is_cancelled() {
                lock(&run.job).observe_cancel(run.cancel);
                break;
            }
            let Some(task) = lock(&run.queue).pop_front() else {
                break;
            };

            let (text, fell_back) = match self.translate_one(&task.source).await {
                Ok(t) => (t, false),
                Err(e) => {
                    warn!("orchestrator: task {} kept source text: {e}", task.index);
                    (task.source.clone(), true)
                }
            };

            let snapshot = {
                let mut job = lock(&run.job);
                job.observe_cancel(run.cancel);
                if job.cancelled {
                    debug!("orchestrator: worker {id} dropped task {} after cancel", task.index);
                    break;
                }
                job.record(task.index, text.clone(), fell_back);
                run.observer.on_result(task.index, &task.source, &text);
                run.observer.on_progress(job.completed, job.total);
                job.observe_cancel(run.cancel);
                job.take_autosave(self.options.autosave_every)
            };

            if let Some(partial) = snapshot {
                let mut saved = run.saved.lock().await;
                if partial.len() > *saved {
                    debug!("orchestrator: autosave after {} results", partial.len());
                    run.observer.on_autosave(&partial).await;
                    *saved = partial.len();
                }
            }
        }
    }

    /// One call with timeout and validation. The caller handles fallback.
    async fn translate_one(&self, source: &str) -> Result<String, ModlingoError> {
        let call = self
            .translator
            .try_translate(source, &self.options.target_language);
        let translated = match tokio::time::timeout(self.options.call_timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ModlingoError::TranslationCall(format!(
                    "{}: timed out after {}s",
                    self.translator.name(),
                    self.options.call_timeout.as_secs_f32()
                )))
            }
        };
        if translated.trim().is_empty() {
            return Err(ModlingoError::TranslationCall(format!(
                "{}: empty translation",
                self.translator.name()
            )));
        }
        if translated.trim() == source.trim() {
            return Err(ModlingoError::TranslationCall(format!(
                "{}: reply echoed the source text",
                self.translator.name()
            )));
        }
        check_placeholders(source, &translated)?;
        Ok(translated)
    }
}
