//! Durable skip-list store: filenames excluded from future downloads.
//!
//! Backed by a small CSV table (`filename,reason,timestamp`). The whole
//! table is held in memory and rewritten atomically (write tmp + rename) on
//! every change, so a crash never leaves a half-written record behind.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reason a wallpaper was blacklisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Image width is below the configured minimum.
    #[serde(rename = "TOO_SMALL")]
    TooSmall,
    /// User deleted the wallpaper and never wants it back.
    #[serde(rename = "DELETED")]
    Deleted,
    /// Border pixels are predominantly one near-uniform color.
    #[serde(rename = "BORING_BACKGROUND")]
    BoringBackground,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall => write!(f, "TOO_SMALL"),
            Self::Deleted => write!(f, "DELETED"),
            Self::BoringBackground => write!(f, "BORING_BACKGROUND"),
        }
    }
}

/// One record in the skip-list store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipEntry {
    /// Target filename, the unique key.
    pub filename: String,
    /// Why the file was blacklisted.
    pub reason: SkipReason,
    /// When the entry was last written.
    pub timestamp: DateTime<Utc>,
}

/// CSV-backed store mapping filename → (reason, timestamp).
///
/// One entry per filename; re-adding overwrites reason and timestamp
/// (last-write-wins). A filename present here must never be re-fetched by
/// the download manager unless the store is explicitly reset.
#[derive(Debug)]
pub struct SkipList {
    path: PathBuf,
    entries: HashMap<String, SkipEntry>,
}

impl SkipList {
    /// Opens the store at `path`, creating parent directories and the
    /// backing file (with its header row) on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be created or an existing
    /// file cannot be parsed. Open failure is fatal: the store cannot be
    /// constructed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = HashMap::new();
        let existed = path.exists();
        if existed {
            let mut reader = csv::Reader::from_path(path)?;
            for record in reader.deserialize() {
                let entry: SkipEntry = record?;
                entries.insert(entry.filename.clone(), entry);
            }
        }

        let store = Self {
            path: path.to_path_buf(),
            entries,
        };
        if !existed {
            store.save()?;
        }
        Ok(store)
    }

    /// Idempotent upsert: records `filename` with `reason` and the current
    /// time, overwriting any prior entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be rewritten. The caller must
    /// treat this as fatal; silently losing a blacklist decision would cause
    /// the file to be re-downloaded on the next run.
    pub fn add(&mut self, filename: &str, reason: SkipReason) -> Result<()> {
        let entry = SkipEntry {
            filename: filename.to_string(),
            reason,
            timestamp: Utc::now(),
        };
        self.entries.insert(entry.filename.clone(), entry);
        self.save()
    }

    /// Returns `true` if `filename` has an entry, reflecting all prior
    /// `add` calls from this process.
    #[must_use]
    pub fn is_blacklisted(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    /// Returns the recorded reason for `filename`, if any.
    #[must_use]
    pub fn get_reason(&self, filename: &str) -> Option<SkipReason> {
        self.entries.get(filename).map(|e| e.reason)
    }

    /// Returns all entries, most recent first.
    #[must_use]
    pub fn list_all(&self) -> Vec<SkipEntry> {
        let mut all: Vec<SkipEntry> = self.entries.values().cloned().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all
    }

    /// Number of blacklisted filenames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no filename is blacklisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing CSV file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the full table atomically: serialize to a temp file, then
    /// rename over the old one.
    fn save(&self) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path)?;
        if self.entries.is_empty() {
            // serialize() would emit the header itself; with no records we
            // still want the header row on disk.
            writer.write_record(["filename", "reason", "timestamp"])?;
        }
        for entry in self.entries.values() {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_in(dir: &TempDir) -> SkipList {
        SkipList::open(&dir.path().join(".blacklist.csv")).unwrap()
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir);
        assert!(store.path().exists());

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("filename,reason,timestamp"));
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/.blacklist.csv");
        let store = SkipList::open(&path).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn add_then_lookup() {
        let dir = TempDir::new().unwrap();
        let mut store = open_in(&dir);

        store.add("a.jpg", SkipReason::TooSmall).unwrap();
        assert!(store.is_blacklisted("a.jpg"));
        assert!(!store.is_blacklisted("b.jpg"));
        assert_eq!(store.get_reason("a.jpg"), Some(SkipReason::TooSmall));
        assert_eq!(store.get_reason("b.jpg"), None);
    }

    #[test]
    fn add_is_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let mut store = open_in(&dir);

        store.add("a.jpg", SkipReason::TooSmall).unwrap();
        store.add("a.jpg", SkipReason::Deleted).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_reason("a.jpg"), Some(SkipReason::Deleted));
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".blacklist.csv");

        let mut store = SkipList::open(&path).unwrap();
        store.add("a.jpg", SkipReason::BoringBackground).unwrap();
        store.add("b.jpg", SkipReason::TooSmall).unwrap();
        drop(store);

        let reopened = SkipList::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(
            reopened.get_reason("a.jpg"),
            Some(SkipReason::BoringBackground)
        );
        assert_eq!(reopened.get_reason("b.jpg"), Some(SkipReason::TooSmall));
    }

    #[test]
    fn list_all_is_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let mut store = open_in(&dir);

        store.add("first.jpg", SkipReason::TooSmall).unwrap();
        store.add("second.jpg", SkipReason::TooSmall).unwrap();
        store.add("third.jpg", SkipReason::Deleted).unwrap();

        let all = store.list_all();
        let names: Vec<&str> = all.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["third.jpg", "second.jpg", "first.jpg"]);
    }

    #[test]
    fn empty_store_lookups() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir);
        assert!(store.is_empty());
        assert!(store.list_all().is_empty());
        assert!(!store.is_blacklisted("anything.jpg"));
    }

    #[test]
    fn reason_wire_format() {
        assert_eq!(SkipReason::TooSmall.to_string(), "TOO_SMALL");
        assert_eq!(SkipReason::Deleted.to_string(), "DELETED");
        assert_eq!(SkipReason::BoringBackground.to_string(), "BORING_BACKGROUND");
    }

    #[test]
    fn csv_rows_use_wire_reason_names() {
        let dir = TempDir::new().unwrap();
        let mut store = open_in(&dir);
        store.add("a.jpg", SkipReason::BoringBackground).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("BORING_BACKGROUND"));
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = open_in(&dir);
        store.add("a.jpg", SkipReason::TooSmall).unwrap();

        assert!(!dir.path().join(".blacklist.csv.tmp").exists());
    }
}
