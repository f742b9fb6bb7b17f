//! Append-only result stores: one newline-delimited UTF-8 file per outcome.
//!
//! The stores are the durable source of truth for "already processed". Records
//! are appended one line at a time the moment a probe completes; files are
//! never rewritten in place. Opening never truncates — clearing recorded
//! outcomes is an explicit caller decision (`clear`).

use crate::outcome::Outcome;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store init failed for {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("append to {path} failed: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read of {path} failed: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-outcome append-only stores behind a single writer lock. Appends from
/// concurrent workers are serialized; each record is one flushed line.
pub struct ResultStore {
    paths: [PathBuf; 3],
    files: Mutex<[File; 3]>,
}

impl ResultStore {
    /// Store file for one category: `available.txt`, or `available_<keyword>.txt`
    /// when a keyword tags the run.
    pub fn category_path(dir: &Path, outcome: Outcome, keyword: Option<&str>) -> PathBuf {
        let name = match keyword {
            Some(k) => format!("{}_{}.txt", outcome.file_stem(), k),
            None => format!("{}.txt", outcome.file_stem()),
        };
        dir.join(name)
    }

    /// Open (creating if absent) all category stores under `dir`. Existing
    /// contents are kept — resume state must survive restarts.
    pub fn open(dir: &Path, keyword: Option<&str>) -> Result<Self, StoreError> {
        let paths = Outcome::ALL.map(|o| Self::category_path(dir, o, keyword));
        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| StoreError::Init {
                    path: path.clone(),
                    source,
                })?;
            files.push(file);
        }
        let files: [File; 3] = match files.try_into() {
            Ok(arr) => arr,
            Err(_) => unreachable!("three outcome categories"),
        };
        Ok(Self {
            paths,
            files: Mutex::new(files),
        })
    }

    /// Backing files in `Outcome::ALL` order; input for the archiver.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Every previously recorded identifier across all categories. Lines carry
    /// an optional tab-separated note; only the first field is the identifier.
    pub fn load(&self) -> Result<HashSet<String>, StoreError> {
        let mut processed = HashSet::new();
        for path in &self.paths {
            let data = fs::read_to_string(path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            for line in data.lines() {
                let identifier = line.split('\t').next().unwrap_or("").trim();
                if !identifier.is_empty() {
                    processed.insert(identifier.to_string());
                }
            }
        }
        Ok(processed)
    }

    /// Append one record to the category's store and flush it. Serialized
    /// against other appends by the writer lock; no interleaved partial lines.
    pub fn append(
        &self,
        outcome: Outcome,
        identifier: &str,
        note: Option<&str>,
    ) -> Result<(), StoreError> {
        let idx = Self::index(outcome);
        let path = &self.paths[idx];
        let mut files = match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let file = &mut files[idx];
        let write = match note {
            Some(note) => writeln!(file, "{}\t{}", identifier, note),
            None => writeln!(file, "{}", identifier),
        };
        write
            .and_then(|_| file.flush())
            .map_err(|source| StoreError::Append {
                path: path.clone(),
                source,
            })
    }

    /// Truncate every category store. Only for an explicit fresh-run request;
    /// this erases resume state.
    pub fn clear(&self) -> Result<(), StoreError> {
        let files = match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (file, path) in files.iter().zip(&self.paths) {
            file.set_len(0).map_err(|source| StoreError::Init {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn index(outcome: Outcome) -> usize {
        match outcome {
            Outcome::Available => 0,
            Outcome::Taken => 1,
            Outcome::Failed => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path(), None).unwrap();
        store.append(Outcome::Available, "a@x.com", None).unwrap();
        store.append(Outcome::Taken, "b@x.com", None).unwrap();
        store
            .append(Outcome::Failed, "c@x.com", Some("probe timed out"))
            .unwrap();

        let processed = store.load().unwrap();
        assert_eq!(processed.len(), 3);
        assert!(processed.contains("a@x.com"));
        assert!(processed.contains("b@x.com"));
        // Note after the tab is not part of the identifier.
        assert!(processed.contains("c@x.com"));
    }

    #[test]
    fn reopen_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ResultStore::open(dir.path(), None).unwrap();
            store.append(Outcome::Taken, "kept@x.com", None).unwrap();
        }
        let store = ResultStore::open(dir.path(), None).unwrap();
        assert!(store.load().unwrap().contains("kept@x.com"));
        store.append(Outcome::Taken, "second@x.com", None).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn clear_erases_all_categories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path(), None).unwrap();
        store.append(Outcome::Available, "a@x.com", None).unwrap();
        store.append(Outcome::Failed, "b@x.com", None).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
        // Stores stay usable after a clear.
        store.append(Outcome::Available, "c@x.com", None).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn keyword_decorates_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path(), Some("premium")).unwrap();
        store.append(Outcome::Available, "a@x.com", None).unwrap();
        assert!(dir.path().join("available_premium.txt").exists());
        assert!(dir.path().join("taken_premium.txt").exists());
        assert!(dir.path().join("failed_premium.txt").exists());
        assert!(!dir.path().join("available.txt").exists());
    }

    #[test]
    fn one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path(), None).unwrap();
        for i in 0..25 {
            store
                .append(Outcome::Taken, &format!("user{}@x.com", i), None)
                .unwrap();
        }
        let data = fs::read_to_string(dir.path().join("taken.txt")).unwrap();
        assert_eq!(data.lines().count(), 25);
        assert!(data.ends_with('\n'));
    }
}
