//! Ollama translator backed by a local server.
//!
//! Each text is sent as one `/api/chat` call carrying a short few-shot
//! history for the target language. No API key required.

use async_trait::async_trait;
use modlingo_core::{config::OllamaConfig, error::ModlingoError, traits::Translator};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::languages::{profile_for, LanguageProfile};

/// Labels some models put in front of the answer.
const ANSWER_LABELS: &[&str] = &["Translation:", "translation:", "译文：", "译文:", "翻译："];

/// Ollama translator.
pub struct OllamaTranslator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaTranslator {
    /// Create from config values.
    pub fn from_config(base_url: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("ollama: client builder failed ({e}), using defaults");
                reqwest::Client::new()
            });
        Self {
            client,
            base_url,
            model,
        }
    }

    /// Create from the `[ollama]` config section.
    pub fn from_section(cfg: &OllamaConfig) -> Self {
        Self::from_config(
            cfg.base_url.clone(),
            cfg.model.clone(),
            Duration::from_secs(cfg.request_timeout_secs.max(1)),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Names of the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, ModlingoError> {
        let url = self.url("/api/tags");
        debug!("ollama: GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModlingoError::TranslationCall(format!("ollama request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(ModlingoError::TranslationCall(format!(
                "ollama returned {status} listing models"
            )));
        }

        let parsed: OllamaTagsResponse = resp.json().await.map_err(|e| {
            ModlingoError::TranslationCall(format!("ollama: failed to parse model list: {e}"))
        })?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Fill in the model when none is configured, using the first one installed.
    pub async fn resolve_model(&mut self) -> Result<&str, ModlingoError> {
        if self.model.trim().is_empty() {
            let models = self.list_models().await?;
            let first = models.into_iter().next().ok_or_else(|| {
                ModlingoError::Config("ollama has no models installed; run `ollama pull`".into())
            })?;
            info!("ollama: no model configured, using {first}");
            self.model = first;
        }
        Ok(&self.model)
    }
}

// --- Serde types ---

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct OllamaChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaChatMessage>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Instruction prefixed to every user turn.
fn instruction(lang: &LanguageProfile) -> String {
    format!(
        "Translate the following Stardew Valley mod text into {}. \
         Never translate variable names inside curly braces, or the game will fail to load them. \
         Translate character names and nouns fully, using the official localized names. \
         Return only the translation, with no explanation:",
        lang.name
    )
}

fn message(role: &str, content: String) -> OllamaChatMessage {
    OllamaChatMessage {
        role: role.to_string(),
        content,
    }
}

/// Few-shot history followed by the real request.
fn build_messages(text: &str, lang: &LanguageProfile) -> Vec<OllamaChatMessage> {
    let prompt = instruction(lang);
    let mut messages = Vec::new();
    for (source, target) in lang.examples() {
        messages.push(message("user", format!("{prompt} {source}")));
        messages.push(message("assistant", target.to_string()));
    }
    messages.push(message("user", format!("{prompt} {text}")));
    messages
}

/// Trim the reply, drop a leading answer label and collapse blank lines.
fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();
    for label in ANSWER_LABELS {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim_start();
            break;
        }
    }
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Translator for OllamaTranslator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn try_translate(&self, text: &str, target_lang: &str) -> Result<String, ModlingoError> {
        let lang = profile_for(target_lang);
        let url = self.url("/api/chat");
        let start = Instant::now();

        let body = OllamaChatRequest {
            model: self.model.clone(),
            messages: build_messages(text, lang),
            stream: false,
        };

        debug!("ollama: POST {url} model={} lang={}", self.model, lang.code);

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModlingoError::TranslationCall(format!("ollama request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ModlingoError::TranslationCall(format!(
                "ollama returned {status}: {text}"
            )));
        }

        let parsed: OllamaChatResponse = resp.json().await.map_err(|e| {
            ModlingoError::TranslationCall(format!("ollama: failed to parse response: {e}"))
        })?;

        let translated = parsed
            .message
            .map(|m| clean_response(&m.content))
            .unwrap_or_default();

        debug!(
            "ollama: {} chars in {}ms (eval_count={:?})",
            translated.chars().count(),
            start.elapsed().as_millis(),
            parsed.eval_count
        );

        if translated.is_empty() {
            return Err(ModlingoError::TranslationCall(
                "ollama returned an empty translation".into(),
            ));
        }
        Ok(translated)
    }

    async fn is_available(&self) -> bool {
        let url = self.url("/api/tags");
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("ollama not available: {e}");
                false
            }
        }
    }
}
