//! Reading, writing and listing localization files.

use modlingo_core::{codec, document::LocalizationDocument, error::ModlingoError, pairing};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Read a file and parse it, returning the raw text alongside the document.
pub fn read_document(path: &Path) -> Result<(String, LocalizationDocument), ModlingoError> {
    let raw = std::fs::read_to_string(path)?;
    let doc = codec::parse(&raw)?;
    Ok((raw, doc))
}

/// Replace `path` with `contents` through a temp file in the same directory.
///
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ModlingoError> {
    let write_err = |source: std::io::Error| ModlingoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("fs: wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// [`write_atomic`], retried once immediately on failure.
pub fn write_with_retry(path: &Path, contents: &str) -> Result<(), ModlingoError> {
    match write_atomic(path, contents) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("fs: write to {} failed, retrying: {e}", path.display());
            write_atomic(path, contents)
        }
    }
}

/// JSON-like files under `root`, relative to it and sorted.
pub fn scan_tree(root: &Path) -> Result<Vec<PathBuf>, ModlingoError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| ModlingoError::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_file() || !pairing::is_json_like(entry.path()) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Scan a translation tree (and optionally its original-language tree) and pair the files.
pub fn pair_trees(
    translation_root: &Path,
    original_root: Option<&Path>,
) -> Result<Vec<pairing::FilePair>, ModlingoError> {
    let translations = scan_tree(translation_root)?;
    let originals = match original_root {
        Some(root) if root.is_dir() => scan_tree(root)?,
        Some(root) => {
            warn!("fs: original tree {} not found, continuing without it", root.display());
            Vec::new()
        }
        None => Vec::new(),
    };
    Ok(pairing::pair_files(
        translation_root,
        &translations,
        original_root,
        &originals,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zh.json");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, "{\n    \"a\": \"新\"\n}").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\n    \"a\": \"新\"\n}"
        );
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("zh.json");
        let err = write_with_retry(&path, "{}").unwrap_err();
        match err {
            ModlingoError::Write { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_document_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ \"a\": \"x\" \"b\": \"y\" }").unwrap();
        assert!(matches!(
            read_document(&path),
            Err(ModlingoError::Parse(_))
        ));
    }

    #[test]
    fn test_scan_tree_lists_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("ModB/i18n")).unwrap();
        std::fs::create_dir_all(root.join("ModA/i18n")).unwrap();
        std::fs::write(root.join("ModB/i18n/zh.json"), "{}").unwrap();
        std::fs::write(root.join("ModA/i18n/zh.JSON"), "{}").unwrap();
        std::fs::write(root.join("ModA/manifest.txt"), "").unwrap();

        let files = scan_tree(root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("ModA/i18n/zh.JSON"),
                PathBuf::from("ModB/i18n/zh.json"),
            ]
        );
    }

    #[test]
    fn test_pair_trees_resolves_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let translations = dir.path().join("translated");
        let originals = dir.path().join("original");
        std::fs::create_dir_all(translations.join("Mod/i18n")).unwrap();
        std::fs::create_dir_all(originals.join("Mod/i18n")).unwrap();
        std::fs::write(translations.join("Mod/i18n/zh.json"), "{}").unwrap();
        std::fs::write(originals.join("Mod/i18n/default.json"), "{}").unwrap();

        let pairs = pair_trees(&translations, Some(&originals)).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs[0].original_path.as_deref(),
            Some(originals.join("Mod/i18n/default.json").as_path())
        );
    }
}
