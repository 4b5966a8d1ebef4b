//! Local asset matching: pair a candidate with a downloaded image file.
//!
//! The directory is listed once into an [`AssetStore`]; each candidate then
//! runs an ordered chain of containment rules and the first hit wins. There is
//! no scoring. With `sort_assets` the listing is sorted by file name so ties
//! resolve the same way on every run.
//!
//! Rule order:
//! 1. entity name key (lowercase, spaces → `_`) contained in a file name
//! 2. alt-text key, same normalisation, when the alt text is non-empty
//! 3. each word of the entity name longer than 3 chars, in order

use crate::error::FlagDeckError;
use crate::model::Candidate;
use crate::pipeline::text::match_key;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file in the image store.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AssetEntry {
    path: PathBuf,
    /// Lowercased file name used for containment tests.
    key: String,
}

impl AssetEntry {
    fn new(path: PathBuf) -> Self {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, key }
    }
}

/// Materialised listing of the local image directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
    entries: Vec<AssetEntry>,
}

impl AssetStore {
    /// List the regular files in `dir`.
    ///
    /// # Errors
    /// [`FlagDeckError::AssetDirMissing`] if `dir` is absent,
    /// [`FlagDeckError::AssetDirUnreadable`] if it cannot be listed,
    /// [`FlagDeckError::AssetDirEmpty`] if it holds no files. All are fatal.
    pub fn open(dir: impl AsRef<Path>, sort: bool) -> Result<Self, FlagDeckError> {
        let dir = dir.as_ref();
        let listing = std::fs::read_dir(dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FlagDeckError::AssetDirMissing {
                path: dir.to_path_buf(),
            },
            _ => FlagDeckError::AssetDirUnreadable {
                path: dir.to_path_buf(),
                source: e,
            },
        })?;

        let paths = listing
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path());

        let store = Self::from_paths(dir, paths, sort);
        if store.is_empty() {
            return Err(FlagDeckError::AssetDirEmpty {
                path: dir.to_path_buf(),
            });
        }

        debug!("Asset store {}: {} files", dir.display(), store.len());
        Ok(store)
    }

    /// Build a store from an existing listing without touching the filesystem.
    pub fn from_paths<I>(dir: impl Into<PathBuf>, paths: I, sort: bool) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut entries: Vec<AssetEntry> = paths.into_iter().map(AssetEntry::new).collect();
        if sort {
            entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        }
        Self {
            dir: dir.into(),
            entries,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First file whose name contains `needle` (already lowercase).
    fn first_containing(&self, needle: &str) -> Option<&Path> {
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.key.contains(needle))
            .map(|e| e.path.as_path())
    }

    /// Resolve `candidate` to a local file, or `None` when no rule matches.
    pub fn find_match(&self, candidate: &Candidate) -> Option<PathBuf> {
        match_by_name(self, candidate)
            .or_else(|| match_by_alt_text(self, candidate))
            .or_else(|| match_by_word(self, candidate))
            .map(Path::to_path_buf)
    }
}

fn match_by_name<'s>(store: &'s AssetStore, candidate: &Candidate) -> Option<&'s Path> {
    store.first_containing(&match_key(&candidate.entity_name))
}

fn match_by_alt_text<'s>(store: &'s AssetStore, candidate: &Candidate) -> Option<&'s Path> {
    let alt = candidate.image_alt_text.trim();
    if alt.is_empty() {
        return None;
    }
    store.first_containing(&match_key(alt))
}

fn match_by_word<'s>(store: &'s AssetStore, candidate: &Candidate) -> Option<&'s Path> {
    candidate
        .entity_name
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .find_map(|w| store.first_containing(&w.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(names: &[&str]) -> AssetStore {
        AssetStore::from_paths("flags", names.iter().map(|n| Path::new("flags").join(n)), true)
    }

    fn candidate(name: &str, alt: &str) -> Candidate {
        Candidate {
            entity_name: name.into(),
            image_alt_text: alt.into(),
            image_source_ref: String::new(),
        }
    }

    #[test]
    fn exact_name_matches_file() {
        let s = store(&["001_Flag_of_Chad.svg.png"]);
        assert_eq!(
            s.find_match(&candidate("Chad", "")),
            Some(PathBuf::from("flags/001_Flag_of_Chad.svg.png"))
        );
    }

    #[test]
    fn no_overlap_returns_none() {
        let s = store(&["001_Flag_of_Chad.svg.png"]);
        assert_eq!(s.find_match(&candidate("Peru", "Flag of Peru")), None);
    }

    #[test]
    fn multi_word_name_uses_underscores() {
        let s = store(&["010_Flag_of_Saudi_Arabia.svg.png", "011_Flag_of_Saudi.png"]);
        assert_eq!(
            s.find_match(&candidate("Saudi Arabia", "")),
            Some(PathBuf::from("flags/010_Flag_of_Saudi_Arabia.svg.png"))
        );
    }

    #[test]
    fn alt_text_is_second_rule() {
        let s = store(&["042_Flag_of_the_Gambia.svg.png"]);
        assert_eq!(
            s.find_match(&candidate("The Republic", "Flag of the Gambia")),
            Some(PathBuf::from("flags/042_Flag_of_the_Gambia.svg.png"))
        );
    }

    #[test]
    fn name_rule_beats_alt_rule_across_files() {
        let s = store(&["001_Flag_of_Alt.png", "002_Flag_of_Named.png"]);
        assert_eq!(
            s.find_match(&candidate("Named", "Flag of Alt")),
            Some(PathBuf::from("flags/002_Flag_of_Named.png"))
        );
    }

    #[test]
    fn word_fallback_skips_short_words_and_keeps_order() {
        let s = store(&["001_Flag of Bosnia.png", "002_Flag of Herzegovina.png"]);
        assert_eq!(
            s.find_match(&candidate("Bosnia and Herzegovina", "")),
            Some(PathBuf::from("flags/001_Flag of Bosnia.png"))
        );
        let s = store(&["001_and.png"]);
        assert_eq!(s.find_match(&candidate("Bosnia and Herzegovina", "")), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let s = store(&["007_FLAG_OF_FRANCE.PNG"]);
        assert!(s.find_match(&candidate("france", "")).is_some());
    }

    #[test]
    fn sorted_listing_is_deterministic() {
        let unsorted = ["b_Chad.png", "a_Chad.png"];
        let sorted = AssetStore::from_paths("flags", unsorted.iter().map(PathBuf::from), true);
        assert_eq!(sorted.find_match(&candidate("Chad", "")), Some(PathBuf::from("a_Chad.png")));

        let listed = AssetStore::from_paths("flags", unsorted.iter().map(PathBuf::from), false);
        assert_eq!(listed.find_match(&candidate("Chad", "")), Some(PathBuf::from("b_Chad.png")));
    }

    #[test]
    fn open_missing_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = AssetStore::open(tmp.path().join("nope"), true).unwrap_err();
        assert!(matches!(err, FlagDeckError::AssetDirMissing { .. }));
    }

    #[test]
    fn open_file_instead_of_dir_is_unreadable_not_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("flags");
        std::fs::write(&file, b"not a directory").unwrap();

        let err = AssetStore::open(&file, true).unwrap_err();

        assert!(matches!(err, FlagDeckError::AssetDirUnreadable { .. }), "{err}");
        assert!(!err.to_string().contains("not found"), "{err}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn open_keeps_the_directory_path() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("001_Flag_of_Chad.png"), b"png").unwrap();
        let s = AssetStore::open(tmp.path(), true).unwrap();
        assert_eq!(s.dir(), tmp.path());
    }

    #[test]
    fn open_empty_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let err = AssetStore::open(tmp.path(), true).unwrap_err();
        assert!(matches!(err, FlagDeckError::AssetDirEmpty { .. }));
    }

    #[test]
    fn open_lists_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("001_Flag_of_Chad.svg.png"), b"png").unwrap();
        std::fs::create_dir(tmp.path().join("002_Flag_of_Mali")).unwrap();
        let s = AssetStore::open(tmp.path(), true).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.find_match(&candidate("Mali", "")), None);
    }
}
