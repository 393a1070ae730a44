//! Decides which entries of a translation file need (re)translation.
//!
//! The source-language test is a character-ratio heuristic, not a language
//! detector. Short strings and strings mixing scripts can land on either
//! side of the threshold, so the threshold is exposed as a tunable policy.

use crate::document::LocalizationDocument;
use crate::placeholder::is_only_placeholders;

/// Heuristic for "this text is still mostly in the source language".
///
/// Whitespace and punctuation are stripped; the text counts as source
/// language when the share of ASCII letters among the remaining characters
/// exceeds `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceLanguagePolicy {
    pub threshold: f64,
}

impl Default for SourceLanguagePolicy {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

impl SourceLanguagePolicy {
    pub fn is_mainly_source_language(&self, text: &str) -> bool {
        let mut total = 0usize;
        let mut ascii_alpha = 0usize;
        for c in text.chars().filter(|c| c.is_alphanumeric() || *c == '_') {
            total += 1;
            if c.is_ascii_alphabetic() {
                ascii_alpha += 1;
            }
        }
        if total == 0 {
            return false;
        }
        ascii_alpha as f64 / total as f64 > self.threshold
    }
}

/// [`SourceLanguagePolicy::is_mainly_source_language`] with the default threshold.
pub fn is_mainly_source_language(text: &str) -> bool {
    SourceLanguagePolicy::default().is_mainly_source_language(text)
}

/// [`Evaluator::should_translate`] with the default policy.
pub fn should_translate(key: &str, current: &str, original: Option<&LocalizationDocument>) -> bool {
    Evaluator::default().should_translate(key, current, original)
}

/// Whether a string value is worth sending to a translator at all.
///
/// Blank text, list-like markers (`[...]`), bare numbers and text made only
/// of placeholders are never submitted.
pub fn is_translatable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with('[')
        && !trimmed.chars().all(|c| c.is_ascii_digit())
        && !is_only_placeholders(trimmed)
}

/// One entry picked for translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntry {
    pub key: String,
    /// Text to submit: the original-language value when one exists,
    /// otherwise the current value.
    ///
    /// A stale translation is therefore retranslated from the upstream text,
    /// not from whatever the translation file currently holds.
    pub source: String,
}

/// Result of scanning one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub entries: Vec<SelectedEntry>,
    /// String entries considered (translatable in either language).
    pub candidates: usize,
    /// Candidates judged already translated.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    pub policy: SourceLanguagePolicy,
}

impl Evaluator {
    pub fn new(policy: SourceLanguagePolicy) -> Self {
        Self { policy }
    }

    /// Decide whether `key` with value `current` needs translation.
    pub fn should_translate(
        &self,
        key: &str,
        current: &str,
        original: Option<&LocalizationDocument>,
    ) -> bool {
        if current.trim().is_empty() {
            return true;
        }
        let mainly_source = self.policy.is_mainly_source_language(current);
        match original.and_then(|o| o.get_str(key)) {
            Some(original_text) => {
                current == original_text || (mainly_source && current != original_text)
            }
            None => mainly_source,
        }
    }

    /// Walk `document` in order and pick every entry that needs translation.
    pub fn select(
        &self,
        document: &LocalizationDocument,
        original: Option<&LocalizationDocument>,
    ) -> Selection {
        let mut selection = Selection::default();
        for (key, current) in document.string_entries() {
            let original_text = original
                .and_then(|o| o.get_str(key))
                .filter(|t| is_translatable(t));
            let considered = is_translatable(current)
                || (current.trim().is_empty() && original_text.is_some());
            if !considered {
                continue;
            }
            selection.candidates += 1;
            if self.should_translate(key, current, original) {
                selection.entries.push(SelectedEntry {
                    key: key.to_string(),
                    source: original_text.unwrap_or(current).to_string(),
                });
            } else {
                selection.skipped += 1;
            }
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(&str, &str)]) -> LocalizationDocument {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_mainly_source_language_ratio() {
        assert!(is_mainly_source_language("Farm Quarry"));
        assert!(is_mainly_source_language("Beer, mead, and pale ale!"));
        assert!(!is_mainly_source_language("农场采石场"));
        assert!(!is_mainly_source_language("等级{{level}}大剑"));
        assert!(!is_mainly_source_language("   ...  "));
        // Digits count against the ratio.
        assert!(!is_mainly_source_language("v1.2.3 build 4567"));
    }

    #[test]
    fn test_policy_threshold_is_tunable() {
        let strict = SourceLanguagePolicy { threshold: 0.95 };
        assert!(!strict.is_mainly_source_language("Level 10 shield"));
        assert!(SourceLanguagePolicy::default().is_mainly_source_language("Level 10 shield"));
    }

    #[test]
    fn test_blank_value_always_translates() {
        assert!(should_translate("k", "   ", None));
        assert!(should_translate("k", "", Some(&doc(&[("k", "Hello")]))));
    }

    #[test]
    fn test_value_equal_to_original_always_translates() {
        let original = doc(&[("k", "农场"), ("n", "123 456")]);
        assert!(should_translate("k", "农场", Some(&original)));
        assert!(should_translate("n", "123 456", Some(&original)));
    }

    #[test]
    fn test_stale_english_translation_is_retranslated() {
        let original = doc(&[("k", "Farm Quarry v2")]);
        assert!(should_translate("k", "Farm Quarry", Some(&original)));
    }

    #[test]
    fn test_translated_value_is_kept() {
        let original = doc(&[("k", "Farm Quarry")]);
        assert!(!should_translate("k", "农场采石场", Some(&original)));
        assert!(!should_translate("k", "农场采石场", None));
    }

    #[test]
    fn test_missing_original_key_falls_back_to_heuristic() {
        let original = doc(&[("other", "x")]);
        assert!(should_translate("k", "Iridium Quarry", Some(&original)));
        assert!(!should_translate("k", "铱矿采石场", Some(&original)));
    }

    #[test]
    fn test_is_translatable_filters() {
        assert!(is_translatable("{{x}} World"));
        assert!(!is_translatable("[ItemList] 1 2"));
        assert!(!is_translatable("12345"));
        assert!(!is_translatable("{{count}}"));
        assert!(!is_translatable("  "));
    }

    #[test]
    fn test_select_prefers_original_text_as_source() {
        let current = doc(&[
            ("done", "农场采石场"),
            ("same", "Iridium Quarry"),
            ("stale", "Old text"),
            ("blank", ""),
            ("marker", "[Tag]"),
        ]);
        let original = doc(&[
            ("done", "Farm Quarry"),
            ("same", "Iridium Quarry"),
            ("stale", "New text"),
            ("blank", "Elliott's Cabin"),
            ("marker", "[Tag]"),
        ]);
        let selection = Evaluator::default().select(&current, Some(&original));
        assert_eq!(selection.candidates, 4);
        assert_eq!(selection.skipped, 1);
        assert_eq!(
            selection.entries,
            vec![
                SelectedEntry {
                    key: "same".into(),
                    source: "Iridium Quarry".into()
                },
                SelectedEntry {
                    key: "stale".into(),
                    source: "New text".into()
                },
                SelectedEntry {
                    key: "blank".into(),
                    source: "Elliott's Cabin".into()
                },
            ]
        );
    }

    #[test]
    fn test_select_without_original_uses_current_text() {
        let current = doc(&[("a", "Hello"), ("b", "你好"), ("c", "")]);
        let selection = Evaluator::default().select(&current, None);
        assert_eq!(selection.candidates, 2);
        assert_eq!(
            selection.entries,
            vec![SelectedEntry {
                key: "a".into(),
                source: "Hello".into()
            }]
        );
    }
}
