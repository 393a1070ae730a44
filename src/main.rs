mod progress;

use clap::{Parser, Subcommand};
use modlingo_core::{
    config::{self, Config},
    evaluator::Evaluator,
    pairing::{self, FilePair},
    traits::Translator,
};
use modlingo_engine::{fs, session::Session};
use modlingo_providers::{languages, ollama::OllamaTranslator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "modlingo",
    version,
    about = "Batch-translate game-mod localization files with a local Ollama model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "modlingo.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a file or every JSON file under a directory.
    Translate {
        /// Translation file or tree to update in place.
        path: PathBuf,
        /// Original-language file or tree to compare against.
        #[arg(short, long)]
        original: Option<PathBuf>,
        /// Target language code (overrides config).
        #[arg(short, long)]
        lang: Option<String>,
        /// Maximum concurrent translation calls (overrides config).
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Ollama model (overrides config).
        #[arg(short, long)]
        model: Option<String>,
        /// Write a JSON session report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print every translated entry.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show which entries of a file would be translated, without calling the model.
    Check {
        /// Translation file.
        path: PathBuf,
        /// Original-language file or directory.
        #[arg(short, long)]
        original: Option<PathBuf>,
    },
    /// Check Ollama availability and configuration.
    Status,
    /// List models installed on the Ollama server.
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(&cli.config)?;
    let _log_guard = init_tracing(&cfg);

    match cli.command {
        Commands::Translate {
            path,
            original,
            lang,
            batch_size,
            model,
            report,
            verbose,
        } => {
            if let Some(lang) = lang {
                cfg.translation.target_language = lang;
            }
            if let Some(n) = batch_size {
                cfg.translation.batch_size = n;
            }
            if let Some(model) = model {
                cfg.ollama.model = model;
            }
            translate(&cfg, &path, original.as_deref(), report.as_deref(), verbose).await?;
        }
        Commands::Check { path, original } => check(&cfg, &path, original.as_deref())?,
        Commands::Status => status(&cli.config, &cfg).await?,
        Commands::Models => {
            let translator = OllamaTranslator::from_section(&cfg.ollama);
            let models = translator.list_models().await?;
            if models.is_empty() {
                println!("No models installed. Run `ollama pull <model>` first.");
            }
            for name in models {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Console logging plus a daily log file under `{data_dir}/logs`.
fn init_tracing(cfg: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level));

    let log_dir = PathBuf::from(config::shellexpand(&cfg.general.data_dir)).join("logs");
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "modlingo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("modlingo: cannot create {}: {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

/// Resolve the files to work on from the command-line paths.
fn collect_pairs(path: &Path, original: Option<&Path>) -> anyhow::Result<Vec<FilePair>> {
    if path.is_dir() {
        return Ok(fs::pair_trees(path, original)?);
    }
    if !path.is_file() {
        anyhow::bail!("{} does not exist", path.display());
    }
    Ok(vec![FilePair::new(path, resolve_original_file(path, original)?)])
}

/// The original-language counterpart of a single file.
fn resolve_original_file(path: &Path, original: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let Some(original) = original else {
        return Ok(None);
    };
    if original.is_file() {
        return Ok(Some(original.to_path_buf()));
    }
    if original.is_dir() {
        let listing = fs::scan_tree(original)?;
        let name = path.file_name().map(PathBuf::from).unwrap_or_default();
        return Ok(pairing::find_original(&name, &listing).map(|found| original.join(found)));
    }
    warn!("original {} not found, continuing without it", original.display());
    Ok(None)
}

async fn translate(
    cfg: &Config,
    path: &Path,
    original: Option<&Path>,
    report_path: Option<&Path>,
    verbose: bool,
) -> anyhow::Result<()> {
    cliclack::intro(console::style("modlingo translate").bold().to_string())?;

    let lang = &cfg.translation.target_language;
    if languages::find(lang).is_none() {
        cliclack::log::warning(format!(
            "No examples for language '{lang}', prompting with the Chinese set"
        ))?;
    }

    let mut translator = OllamaTranslator::from_section(&cfg.ollama);
    if !translator.is_available().await {
        anyhow::bail!(
            "Ollama is not reachable at {}. Is `ollama serve` running?",
            cfg.ollama.base_url
        );
    }
    let model = translator.resolve_model().await?.to_string();

    let pairs = collect_pairs(path, original)?;
    if pairs.is_empty() {
        cliclack::log::warning(format!("No JSON files found under {}", path.display()))?;
        cliclack::outro("Nothing to do")?;
        return Ok(());
    }
    cliclack::log::info(format!(
        "{} file(s) | model {model} | target {lang} | {} concurrent | autosave every {}",
        pairs.len(),
        cfg.translation.concurrency(),
        cfg.translation.autosave_every(),
    ))?;

    let mut session = Session::new(Arc::new(translator), &cfg.translation);
    session.enqueue_all(pairs);

    let token = session.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight translations");
            token.cancel();
        }
    });

    let observer = progress::ConsoleProgress::new(verbose);
    let mut report = session.run(&observer).await;

    for file in report.unsaved() {
        match file.save_unsaved() {
            Ok(_) => cliclack::log::success(format!("Saved {} on retry", file.path.display()))?,
            Err(e) => cliclack::log::error(format!(
                "{} is still unsaved: {e}",
                file.path.display()
            ))?,
        }
    }

    if let Some(out) = report_path {
        std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        cliclack::log::info(format!("Report written to {}", out.display()))?;
    }

    let fallbacks: usize = report.files.iter().map(|f| f.fallbacks).sum();
    let summary = format!(
        "{} entries in {} file(s), {} kept in the source language, {:.1}s",
        report.translated_entries(),
        report.files.len(),
        fallbacks,
        (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0,
    );
    if report.cancelled {
        cliclack::outro_cancel(format!("Cancelled after {summary}"))?;
    } else {
        cliclack::outro(format!("Done: {summary}"))?;
    }
    Ok(())
}

fn check(cfg: &Config, path: &Path, original: Option<&Path>) -> anyhow::Result<()> {
    cliclack::intro(console::style("modlingo check").bold().to_string())?;

    let (_, document) = fs::read_document(path)?;
    let original_path = resolve_original_file(path, original)?;
    let original_doc = match &original_path {
        Some(p) => Some(fs::read_document(p)?.1),
        None => None,
    };
    if let Some(p) = &original_path {
        cliclack::log::info(format!("Comparing against {}", p.display()))?;
    }

    let selection =
        Evaluator::new(cfg.translation.source_policy()).select(&document, original_doc.as_ref());
    for entry in &selection.entries {
        cliclack::log::step(format!("{}: {}", entry.key, entry.source))?;
    }
    cliclack::outro(format!(
        "{} of {} entries need translation ({} already translated)",
        selection.entries.len(),
        selection.candidates,
        selection.skipped
    ))?;
    Ok(())
}

async fn status(config_path: &str, cfg: &Config) -> anyhow::Result<()> {
    cliclack::intro(console::style("modlingo status").bold().to_string())?;
    cliclack::log::info(format!("Config: {config_path}"))?;
    cliclack::log::info(format!(
        "Target language: {} | batch size {} | autosave every {}",
        cfg.translation.target_language,
        cfg.translation.concurrency(),
        cfg.translation.autosave_every()
    ))?;

    let translator = OllamaTranslator::from_section(&cfg.ollama);
    let spinner = cliclack::spinner();
    spinner.start(format!("Checking Ollama at {}...", cfg.ollama.base_url));
    if !translator.is_available().await {
        spinner.error("Ollama: not reachable");
        cliclack::outro_cancel("Start it with `ollama serve`")?;
        return Ok(());
    }
    spinner.stop("Ollama: reachable");

    let models = translator.list_models().await.unwrap_or_default();
    let configured = translator.model();
    if configured.is_empty() {
        match models.first() {
            Some(first) => cliclack::log::info(format!("Model: {first} (first installed)"))?,
            None => cliclack::log::warning("No models installed")?,
        }
    } else if models.iter().any(|m| m == configured) {
        cliclack::log::success(format!("Model: {configured}"))?;
    } else {
        cliclack::log::warning(format!("Model {configured} is not installed"))?;
    }

    cliclack::outro("Done")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_flags_parse() {
        let cli = Cli::try_parse_from([
            "modlingo", "translate", "mods/zh", "-o", "mods/en", "--lang", "ja", "-b", "8",
        ])
        .unwrap();
        match cli.command {
            Commands::Translate {
                path,
                original,
                lang,
                batch_size,
                model,
                ..
            } => {
                assert_eq!(path, PathBuf::from("mods/zh"));
                assert_eq!(original, Some(PathBuf::from("mods/en")));
                assert_eq!(lang.as_deref(), Some("ja"));
                assert_eq!(batch_size, Some(8));
                assert!(model.is_none());
            }
            _ => panic!("expected translate"),
        }
        assert_eq!(cli.config, "modlingo.toml");
    }

    #[test]
    fn test_single_file_finds_default_in_original_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("zh.json");
        let originals = dir.path().join("en");
        std::fs::create_dir_all(&originals).unwrap();
        std::fs::write(&file, "{}").unwrap();
        std::fs::write(originals.join("default.json"), "{}").unwrap();

        let pairs = collect_pairs(&file, Some(&originals)).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].original_path, Some(originals.join("default.json")));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_pairs(&dir.path().join("nope.json"), None).is_err());
    }
}
