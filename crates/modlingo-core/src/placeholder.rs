//! `{{identifier}}` placeholder tokens.
//!
//! Placeholders are game-engine variable references and must come out of a
//! translation exactly as they went in.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::ModlingoError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^}]+\}\}").expect("placeholder pattern is valid"));

/// All placeholder tokens in `text`, in order of appearance.
pub fn extract_placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER.find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether `text` is nothing but placeholders and whitespace.
pub fn is_only_placeholders(text: &str) -> bool {
    PLACEHOLDER.replace_all(text, "").trim().is_empty()
}

/// Verify that `translated` carries exactly the placeholder set of `source`.
pub fn check_placeholders(source: &str, translated: &str) -> Result<(), ModlingoError> {
    let expected: BTreeSet<&str> = extract_placeholders(source).into_iter().collect();
    let actual: BTreeSet<&str> = extract_placeholders(translated).into_iter().collect();
    if expected == actual {
        return Ok(());
    }
    Err(ModlingoError::PlaceholderMismatch {
        missing: expected.difference(&actual).map(|s| s.to_string()).collect(),
        unexpected: actual.difference(&expected).map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_order() {
        assert_eq!(
            extract_placeholders("Mod created by {{author}} - Requirements: {{parents}}"),
            vec!["{{author}}", "{{parents}}"]
        );
        assert!(extract_placeholders("Farm Quarry").is_empty());
    }

    #[test]
    fn test_check_accepts_reordered_tokens() {
        assert!(check_placeholders(
            "Mod created by {{author}} - Requirements: {{parents}}",
            "{{author}}によって作成されたMod - 必要条件：{{parents}}"
        )
        .is_ok());
    }

    #[test]
    fn test_check_reports_dropped_and_altered_tokens() {
        let err = check_placeholders("Level {{level}} shield", "等级{{等级}}护盾").unwrap_err();
        match err {
            ModlingoError::PlaceholderMismatch {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec!["{{level}}"]);
                assert_eq!(unexpected, vec!["{{等级}}"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_only_placeholders() {
        assert!(is_only_placeholders("{{name}} {{count}}"));
        assert!(!is_only_placeholders("{{x}} World"));
    }
}
