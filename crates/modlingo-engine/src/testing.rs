//! Scripted translator shared by the engine tests.

use async_trait::async_trait;
use modlingo_core::{error::ModlingoError, traits::Translator};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Translates `text` to `"{lang}:{text}"` unless a reply is scripted for it.
///
/// Tracks how many calls are in flight at once.
#[derive(Default)]
pub(crate) struct MockTranslator {
    pub delay: Duration,
    pub failures: Vec<String>,
    pub replies: HashMap<String, String>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockTranslator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, source: &str) -> Self {
        self.failures.push(source.to_string());
        self
    }

    pub fn replying(mut self, source: &str, reply: &str) -> Self {
        self.replies.insert(source.to_string(), reply.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn try_translate(&self, text: &str, target_lang: &str) -> Result<String, ModlingoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.iter().any(|f| f == text) {
            return Err(ModlingoError::TranslationCall("connection reset".into()));
        }
        Ok(self
            .replies
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{target_lang}:{text}")))
    }

    async fn is_available(&self) -> bool {
        true
    }
}
