//! Matching translation files to their original-language counterparts.
//!
//! Pure functions over directory listings; nothing here touches the disk.

use std::path::{Path, PathBuf};

/// A translation file and, when one was found, its original-language file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub translation_path: PathBuf,
    pub original_path: Option<PathBuf>,
}

impl FilePair {
    pub fn new(translation_path: impl Into<PathBuf>, original_path: Option<PathBuf>) -> Self {
        Self {
            translation_path: translation_path.into(),
            original_path,
        }
    }
}

/// `.json`, `.jsonc` or `.json5`, any case.
pub fn is_json_like(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "jsonc" | "json5"))
        .unwrap_or(false)
}

/// Find the original-language file for `translation_rel`.
///
/// Both arguments are relative to their tree roots. The same relative path
/// wins; otherwise the first JSON-like file in the same directory, preferring
/// one whose stem is `default`.
pub fn find_original(translation_rel: &Path, original_listing: &[PathBuf]) -> Option<PathBuf> {
    if original_listing.iter().any(|p| p == translation_rel) {
        return Some(translation_rel.to_path_buf());
    }

    let dir = translation_rel.parent().unwrap_or_else(|| Path::new(""));
    let mut siblings: Vec<&PathBuf> = original_listing
        .iter()
        .filter(|p| p.parent().unwrap_or_else(|| Path::new("")) == dir && is_json_like(p))
        .collect();
    siblings.sort();

    siblings
        .iter()
        .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some("default"))
        .or_else(|| siblings.first())
        .map(|p| p.to_path_buf())
}

/// Pair every JSON-like translation file with its original, joined onto the roots.
pub fn pair_files(
    translation_root: &Path,
    translation_listing: &[PathBuf],
    original_root: Option<&Path>,
    original_listing: &[PathBuf],
) -> Vec<FilePair> {
    let mut listing: Vec<&PathBuf> = translation_listing
        .iter()
        .filter(|p| is_json_like(p))
        .collect();
    listing.sort();

    listing
        .into_iter()
        .map(|rel| {
            let original = original_root.and_then(|root| {
                find_original(rel, original_listing).map(|found| root.join(found))
            });
            FilePair::new(translation_root.join(rel), original)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_same_relative_path_wins() {
        let originals = paths(&["i18n/default.json", "i18n/zh.json"]);
        assert_eq!(
            find_original(Path::new("i18n/zh.json"), &originals),
            Some(PathBuf::from("i18n/zh.json"))
        );
    }

    #[test]
    fn test_prefers_default_in_same_directory() {
        let originals = paths(&["i18n/a.json", "i18n/default.json", "other/default.json"]);
        assert_eq!(
            find_original(Path::new("i18n/zh.json"), &originals),
            Some(PathBuf::from("i18n/default.json"))
        );
    }

    #[test]
    fn test_first_json_when_no_default() {
        let originals = paths(&["i18n/readme.txt", "i18n/b.json", "i18n/a.jsonc"]);
        assert_eq!(
            find_original(Path::new("i18n/zh.json"), &originals),
            Some(PathBuf::from("i18n/a.jsonc"))
        );
    }

    #[test]
    fn test_no_match_in_other_directories() {
        let originals = paths(&["other/default.json"]);
        assert_eq!(find_original(Path::new("i18n/zh.json"), &originals), None);
    }

    #[test]
    fn test_root_level_files() {
        let originals = paths(&["default.json", "nested/default.json"]);
        assert_eq!(
            find_original(Path::new("zh.json"), &originals),
            Some(PathBuf::from("default.json"))
        );
    }

    #[test]
    fn test_pair_files_joins_roots_and_skips_non_json() {
        let translations = paths(&["i18n/zh.json", "notes.txt", "content.json"]);
        let originals = paths(&["i18n/default.json"]);
        let pairs = pair_files(
            Path::new("/t/Mod"),
            &translations,
            Some(Path::new("/o/Mod")),
            &originals,
        );
        assert_eq!(
            pairs,
            vec![
                FilePair::new("/t/Mod/content.json", None),
                FilePair::new(
                    "/t/Mod/i18n/zh.json",
                    Some(PathBuf::from("/o/Mod/i18n/default.json"))
                ),
            ]
        );
    }

    #[test]
    fn test_is_json_like() {
        assert!(is_json_like(Path::new("a/DEFAULT.JSON")));
        assert!(is_json_like(Path::new("a.json5")));
        assert!(!is_json_like(Path::new("a.json.bak")));
    }
}
