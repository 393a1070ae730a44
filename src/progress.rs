//! Terminal progress display for `modlingo translate`.

use console::{style, Term};
use modlingo_core::{evaluator::Selection, pairing::FilePair};
use modlingo_engine::session::{FileOutcome, FileReport, SessionObserver};
use std::path::Path;

pub struct ConsoleProgress {
    term: Term,
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self {
            term: Term::stderr(),
            verbose,
        }
    }

    fn clear(&self) {
        if self.term.is_term() {
            let _ = self.term.clear_line();
        }
    }
}

impl SessionObserver for ConsoleProgress {
    fn on_file_start(&self, pair: &FilePair) {
        let _ = cliclack::log::step(pair.translation_path.display());
    }

    fn on_selection(&self, _path: &Path, selection: &Selection) {
        if selection.entries.is_empty() {
            return;
        }
        let _ = cliclack::log::info(format!(
            "{} of {} entries need translation",
            selection.entries.len(),
            selection.candidates
        ));
    }

    fn on_entry(&self, key: &str, source: &str, translated: &str) {
        if !self.verbose {
            return;
        }
        self.clear();
        let _ = self.term.write_line(&format!(
            "  {} {} {} {}",
            style(key).dim(),
            source,
            style("->").dim(),
            style(translated).green()
        ));
    }

    fn on_progress(&self, completed: usize, total: usize) {
        if !self.term.is_term() {
            return;
        }
        self.clear();
        let _ = self
            .term
            .write_str(&format!("  {} {completed}/{total}", style("translating").cyan()));
    }

    fn on_autosave(&self, path: &Path, saved: usize) {
        if self.verbose {
            self.clear();
            let _ = self.term.write_line(&format!(
                "  {}",
                style(format!("autosaved {saved} entries to {}", path.display())).dim()
            ));
        }
    }

    fn on_file_done(&self, report: &FileReport) {
        self.clear();
        let counts = format!(
            "{} translated, {} kept in the source language",
            report.translated, report.fallbacks
        );
        let _ = match &report.outcome {
            FileOutcome::Translated => cliclack::log::success(counts),
            FileOutcome::NothingToDo => cliclack::log::success("Already translated"),
            FileOutcome::Skipped(reason) => cliclack::log::warning(format!("Skipped: {reason}")),
            FileOutcome::Cancelled => cliclack::log::warning(format!("Cancelled: {counts}")),
            FileOutcome::Failed(reason) => {
                cliclack::log::error(format!("Not saved: {reason}"))
            }
        };
    }
}
