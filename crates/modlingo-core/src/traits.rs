use crate::error::ModlingoError;
use async_trait::async_trait;
use tracing::warn;

/// Translation backend trait.
///
/// Every backend (Ollama, test doubles, ...) implements this trait to
/// translate one text at a time. Implementations must be safe to call
/// concurrently; the orchestrator keeps several calls in flight.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Translate `text` into `target_lang`, reporting failures.
    async fn try_translate(&self, text: &str, target_lang: &str) -> Result<String, ModlingoError>;

    /// Translate `text`, returning it unchanged on any failure.
    async fn translate(&self, text: &str, target_lang: &str) -> String {
        match self.try_translate(text, target_lang).await {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!("{}: translation failed, keeping source: {e}", self.name());
                text.to_string()
            }
        }
    }

    /// Check if the backend is reachable.
    async fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Translator for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn try_translate(&self, _text: &str, _lang: &str) -> Result<String, ModlingoError> {
            Err(ModlingoError::TranslationCall("connection refused".into()))
        }

        async fn is_available(&self) -> bool {
            false
        }
    }

    struct Blank;

    #[async_trait]
    impl Translator for Blank {
        fn name(&self) -> &str {
            "blank"
        }

        async fn try_translate(&self, _text: &str, _lang: &str) -> Result<String, ModlingoError> {
            Ok("   ".into())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_translate_returns_source_on_error() {
        assert_eq!(Failing.translate("Farm Quarry", "zh").await, "Farm Quarry");
    }

    #[tokio::test]
    async fn test_translate_returns_source_on_blank_output() {
        assert_eq!(Blank.translate("Farm Quarry", "zh").await, "Farm Quarry");
    }
}
