// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Filesystem-backed note store

use crate::codec::{self, LoadOutcome};
use crate::note::{Metadata, NoteRecord};
use crate::sanitize::sanitize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid file name")]
    InvalidName,
    #[error("no file selected")]
    NoSelection,
    #[error("note not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A note read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedNote {
    pub record: NoteRecord,
    pub outcome: LoadOutcome,
}

/// CRUD over the note files of a single directory.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for a note, or None when the name sanitizes to nothing.
    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        let name = sanitize(file_name);
        if name.is_empty() {
            None
        } else {
            Some(self.dir.join(name))
        }
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name).map_or(false, |p| p.is_file())
    }

    /// File names in the notes directory, sorted case-insensitively.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        fs::create_dir_all(&self.dir)?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let meta = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if !meta.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.trim().is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        Ok(names)
    }

    /// Load a note with all metadata fields starting empty.
    pub fn load(&self, file_name: &str) -> Result<LoadedNote, StoreError> {
        self.load_with(file_name, &Metadata::default())
    }

    /// Load a note, applying its header on top of `prior`.
    pub fn load_with(&self, file_name: &str, prior: &Metadata) -> Result<LoadedNote, StoreError> {
        let name = sanitize(file_name);
        let path = match self.path_for(&name) {
            Some(p) if p.is_file() => p,
            _ => return Err(StoreError::NotFound(name)),
        };

        let bytes = fs::read(&path)?;
        let text = decode_text(&bytes);
        let (metadata, body, outcome) = codec::decode_or_fallback(&text, prior);
        if outcome == LoadOutcome::Fallback {
            tracing::info!(file = %name, "no note header, loading as plain text");
        }
        tracing::debug!(file = %name, bytes = bytes.len(), "loaded note");

        Ok(LoadedNote {
            record: NoteRecord::new(name, metadata, body),
            outcome,
        })
    }

    /// Encode and write a record. Returns the sanitized name actually used.
    pub fn save(&self, record: &NoteRecord) -> Result<String, StoreError> {
        let name = sanitize(&record.file_name);
        if name.is_empty() {
            return Err(StoreError::InvalidName);
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&name);
        fs::write(&path, codec::encode(record))?;
        tracing::debug!(file = %name, "saved note");
        Ok(name)
    }

    pub fn delete(&self, file_name: &str) -> Result<(), StoreError> {
        let path = self.path_for(file_name).ok_or(StoreError::NoSelection)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(sanitize(file_name)));
        }
        fs::remove_file(&path)?;
        tracing::info!(path = %path.display(), "deleted note");
        Ok(())
    }
}

/// Bytes to text: UTF-8 with an optional BOM, or UTF-16 when a UTF-16 BOM is
/// present. Invalid sequences are replaced rather than rejected.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return utf16_lossy(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return utf16_lossy(rest, u16::from_be_bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn utf16_lossy(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, NoteStore) {
        let tmp = TempDir::new().unwrap();
        let store = NoteStore::new(tmp.path().join("notes"));
        (tmp, store)
    }

    fn record(name: &str, body: &str) -> NoteRecord {
        let mut meta = Metadata::default();
        meta.name = "Aria".to_string();
        meta.relationship = "Allies".to_string();
        NoteRecord::new(name, meta, body)
    }

    #[test]
    fn list_creates_directory_lazily() {
        let (_tmp, store) = store();
        assert!(!store.dir().exists());
        assert!(store.list().unwrap().is_empty());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_tmp, store) = store();
        let rec = record("session", "Line one\nLine two\n");
        let name = store.save(&rec).unwrap();
        assert_eq!(name, "session.txt");

        let loaded = store.load("session").unwrap();
        assert_eq!(loaded.outcome, LoadOutcome::Parsed);
        assert_eq!(loaded.record.file_name, "session.txt");
        assert_eq!(loaded.record.metadata, rec.metadata);
        assert_eq!(loaded.record.body, rec.body);
    }

    #[test]
    fn save_sanitizes_traversal_attempts() {
        let (tmp, store) = store();
        let name = store.save(&record("../escape", "x")).unwrap();
        assert_eq!(name, "escape.txt");
        assert!(store.dir().join("escape.txt").is_file());
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn save_rejects_empty_name() {
        let (_tmp, store) = store();
        let err = store.save(&record("   ", "x")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidName));
        assert!(!store.dir().exists());
    }

    #[test]
    fn list_is_case_insensitive_and_skips_directories() {
        let (_tmp, store) = store();
        for name in ["beta", "Alpha", "gamma.md"] {
            store.save(&record(name, "")).unwrap();
        }
        fs::create_dir_all(store.dir().join("archive")).unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec!["Alpha.txt", "beta.txt", "gamma.md"]
        );
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_tmp, store) = store();
        assert!(matches!(store.load("ghost"), Err(StoreError::NotFound(n)) if n == "ghost.txt"));
        assert!(matches!(store.load(""), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn plain_text_file_loads_as_body() {
        let (_tmp, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("old.txt"), "written before headers\n").unwrap();

        let mut prior = Metadata::default();
        prior.name = "Stale".to_string();
        let loaded = store.load_with("old.txt", &prior).unwrap();
        assert_eq!(loaded.outcome, LoadOutcome::Fallback);
        assert_eq!(loaded.record.metadata, Metadata::default());
        assert_eq!(loaded.record.body, "written before headers\n");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let (_tmp, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"---RP-tools---\nName=Aria\n---\nhello");
        fs::write(store.dir().join("bom.txt"), bytes).unwrap();

        let loaded = store.load("bom.txt").unwrap();
        assert_eq!(loaded.outcome, LoadOutcome::Parsed);
        assert_eq!(loaded.record.metadata.name, "Aria");
        assert_eq!(loaded.record.body, "hello");
    }

    #[test]
    fn utf16_le_with_bom_is_decoded() {
        let (_tmp, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "---RP-Session-Report---\r\nGroup=Circle\r\n---\r\nhi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(store.dir().join("wide.txt"), bytes).unwrap();

        let loaded = store.load("wide.txt").unwrap();
        assert_eq!(loaded.outcome, LoadOutcome::Parsed);
        assert_eq!(loaded.record.metadata.group, "Circle");
        assert_eq!(loaded.record.body, "hi");
    }

    #[test]
    fn delete_with_no_selection_leaves_store_unchanged() {
        let (_tmp, store) = store();
        store.save(&record("keep", "x")).unwrap();
        let before = store.list().unwrap().len();

        assert!(matches!(store.delete(""), Err(StoreError::NoSelection)));
        assert!(matches!(store.delete("  "), Err(StoreError::NoSelection)));
        assert_eq!(store.list().unwrap().len(), before);
    }

    #[test]
    fn delete_missing_and_existing() {
        let (_tmp, store) = store();
        store.save(&record("gone", "x")).unwrap();
        assert!(matches!(store.delete("nope"), Err(StoreError::NotFound(_))));

        store.delete("gone").unwrap();
        assert!(!store.exists("gone"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn save_overwrites_existing_note() {
        let (_tmp, store) = store();
        store.save(&record("same", "first")).unwrap();
        store.save(&record("same", "second")).unwrap();
        assert_eq!(store.load("same").unwrap().record.body, "second");
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
