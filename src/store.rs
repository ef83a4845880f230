//! JSON persistence for the book collection. The whole library lives in one
//! pretty-printed array that is read once at startup and rewritten after
//! every change.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::Book;

/// Suffix of the copy taken when an unreadable library file is found.
const CORRUPT_SUFFIX: &str = "corrupt";
/// Suffix of the scratch file a save writes before renaming it into place.
const TMP_SUFFIX: &str = "tmp";

/// What `load` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub books: Vec<Book>,
    /// Set when a library file existed but could not be parsed.
    pub recovery: Option<Recovery>,
}

/// Details of an unparseable library file that was set aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// Copy of the original bytes, untouched.
    pub backup_path: PathBuf,
    /// Parser message explaining what was wrong.
    pub reason: String,
}

impl Recovery {
    /// Sentence suitable for a status bar or stderr.
    pub fn message(&self) -> String {
        format!(
            "Library file was unreadable ({}); starting empty. The original was kept at {}.",
            self.reason,
            self.backup_path.display()
        )
    }
}

/// Handle to the library document on disk.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    path: PathBuf,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. A missing file is a first run and yields an empty
    /// library. A file that does not parse also yields an empty library, but
    /// only after a backup copy is written so a later save cannot destroy it.
    pub fn load(&self) -> Result<LoadOutcome, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no library file yet, starting empty");
                return Ok(LoadOutcome {
                    books: Vec::new(),
                    recovery: None,
                });
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_slice::<Vec<Book>>(&bytes) {
            Ok(books) => {
                info!(path = %self.path.display(), count = books.len(), "loaded library");
                Ok(LoadOutcome {
                    books,
                    recovery: None,
                })
            }
            Err(err) => {
                let backup_path = self.backup_corrupt(&bytes)?;
                warn!(
                    path = %self.path.display(),
                    backup = %backup_path.display(),
                    error = %err,
                    "library file is not valid, starting empty"
                );
                Ok(LoadOutcome {
                    books: Vec::new(),
                    recovery: Some(Recovery {
                        backup_path,
                        reason: err.to_string(),
                    }),
                })
            }
        }
    }

    /// Overwrite the library with `books`. The document is written to a
    /// sibling scratch file and renamed over the target, so an interrupted
    /// save leaves the previous version intact.
    pub fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        let rendered = render(books)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp_path = sibling(&self.path, TMP_SUFFIX);
        let result = write_synced(&tmp_path, &rendered)
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(source) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(source));
        }

        debug!(path = %self.path.display(), count = books.len(), "saved library");
        Ok(())
    }

    /// Copy unparseable bytes next to the library file, picking the first
    /// free name among `<file>.corrupt`, `<file>.corrupt.1`, ... An existing
    /// backup with identical contents is reused, so loading the same broken
    /// file again writes nothing.
    fn backup_corrupt(&self, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let mut candidate = sibling(&self.path, CORRUPT_SUFFIX);
        let mut attempt = 0u32;
        while candidate.exists() {
            if fs::read(&candidate).is_ok_and(|existing| existing == bytes) {
                debug!(backup = %candidate.display(), "corrupt contents already backed up");
                return Ok(candidate);
            }
            attempt += 1;
            candidate = sibling(&self.path, &format!("{CORRUPT_SUFFIX}.{attempt}"));
        }
        fs::write(&candidate, bytes).map_err(|source| StoreError::Backup {
            path: candidate.clone(),
            source,
        })?;
        Ok(candidate)
    }
}

/// Pretty JSON with four-space indentation.
fn render(books: &[Book]) -> Result<Vec<u8>, StoreError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    books.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// `library.json` + `tmp` → `library.json.tmp`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn sample() -> Vec<Book> {
        vec![
            Book::new("Dune", "Herbert")
                .with_year("1965")
                .with_genre("Science Fiction")
                .mark_read(Some(5)),
            Book::new("It", "King").with_year("1986").with_genre("Fiction"),
        ]
    }

    #[test]
    fn missing_file_loads_empty_without_recovery() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        let outcome = store.load().expect("load succeeds");
        assert!(outcome.books.is_empty());
        assert!(outcome.recovery.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        store.save(&sample()).expect("save succeeds");
        let outcome = store.load().expect("load succeeds");
        assert_eq!(outcome.books, sample());
        assert!(outcome.recovery.is_none());
    }

    #[test]
    fn saved_document_uses_null_rating_and_four_space_indent() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("library.json"));
        store.save(&sample()).expect("save succeeds");
        let text = fs::read_to_string(store.path()).expect("file exists");
        assert!(text.contains("\"rating\": null"));
        assert!(text.contains("\n    {\n        \"title\": \"Dune\""));
        assert!(!sibling(store.path(), TMP_SUFFIX).exists());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path().join("nested/deeper/library.json"));
        store.save(&sample()).expect("save succeeds");
        assert!(store.path().exists());
    }

    #[test]
    fn invalid_json_loads_empty_and_keeps_backup() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        fs::write(&path, "{ not json").expect("seed file");
        let store = LibraryStore::new(&path);

        let outcome = store.load().expect("load succeeds");
        assert!(outcome.books.is_empty());
        let recovery = outcome.recovery.expect("recovery reported");
        assert_eq!(recovery.backup_path, dir.path().join("library.json.corrupt"));
        assert_eq!(
            fs::read_to_string(&recovery.backup_path).expect("backup exists"),
            "{ not json"
        );
        assert_eq!(fs::read_to_string(&path).expect("original kept"), "{ not json");
    }

    #[test]
    fn repeated_corruption_does_not_overwrite_earlier_backup() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        fs::write(&path, "first").expect("seed file");
        let store = LibraryStore::new(&path);
        store.load().expect("first load");

        fs::write(&path, "second").expect("reseed file");
        let outcome = store.load().expect("second load");
        let recovery = outcome.recovery.expect("recovery reported");
        assert_eq!(recovery.backup_path, dir.path().join("library.json.corrupt.1"));
        assert_eq!(
            fs::read_to_string(dir.path().join("library.json.corrupt")).expect("first backup"),
            "first"
        );
    }

    #[test]
    fn reloading_same_corrupt_file_reuses_backup() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        fs::write(&path, "{ broken").expect("seed file");
        let store = LibraryStore::new(&path);

        let first = store.load().expect("first load").recovery.expect("recovery");
        let second = store.load().expect("second load").recovery.expect("recovery");
        assert_eq!(first.backup_path, second.backup_path);

        let backups = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn odd_rating_does_not_discard_the_library() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        fs::write(
            &path,
            r#"[{"title": "Dune", "author": "Herbert", "read": true, "rating": -1},
                {"title": "It", "author": "King", "read": true, "rating": 4}]"#,
        )
        .expect("seed file");
        let outcome = LibraryStore::new(&path).load().expect("load succeeds");
        assert!(outcome.recovery.is_none());
        let ratings: Vec<_> = outcome.books.iter().map(|book| book.rating).collect();
        assert_eq!(ratings, vec![None, Some(4)]);
    }

    #[test]
    fn wrong_shape_counts_as_corrupt() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("library.json");
        fs::write(&path, r#"{"title": "Dune"}"#).expect("seed file");
        let outcome = LibraryStore::new(&path).load().expect("load succeeds");
        assert!(outcome.books.is_empty());
        assert!(outcome.recovery.is_some());
    }

    #[test]
    fn save_into_a_file_path_parent_fails() {
        let dir = tempdir().expect("temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").expect("seed file");
        let store = LibraryStore::new(blocker.join("library.json"));
        let err = store.save(&sample()).expect_err("parent is a file");
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn directory_in_place_of_file_is_a_read_error() {
        let dir = tempdir().expect("temp dir");
        let store = LibraryStore::new(dir.path());
        let err = store.load().expect_err("a directory cannot be read");
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[test]
    fn sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("/data/library.json"), "tmp"),
            PathBuf::from("/data/library.json.tmp")
        );
    }
}
