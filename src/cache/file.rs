//! File Backend Module
//!
//! Persists each cache entry as `<dir>/<id>.json`. The directory is created
//! on first write, so a missing directory simply reads as an empty cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::cache::backend::{CacheBackend, StoredEntry};
use crate::cache::CacheEntry;
use crate::error::StorageResult;

const EXTENSION: &str = "json";

/// Suffix for in-flight writes; never picked up by scans.
const TEMP_EXTENSION: &str = "tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// == File Backend ==
/// One JSON file per normalized key.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    fn temp_path_for(&self, id: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{id}.{}.{n}.{TEMP_EXTENSION}", std::process::id()))
    }

    /// Lists `(id, path)` for every cache file in the directory.
    fn files(&self) -> StorageResult<Vec<(String, PathBuf)>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for dir_entry in read_dir {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((id.to_string(), path.clone()));
            }
        }
        Ok(files)
    }
}

impl CacheBackend for FileBackend {
    fn read(&self, id: &str) -> StorageResult<Option<CacheEntry>> {
        match fs::read_to_string(self.path_for(id)) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, id: &str, entry: &CacheEntry) -> StorageResult<()> {
        let raw = serde_json::to_string(entry)?;
        fs::create_dir_all(&self.dir)?;

        // Readers only ever see a complete file: write aside, then rename over
        let temp = self.temp_path_for(id);
        fs::write(&temp, raw)?;
        if let Err(e) = fs::rename(&temp, self.path_for(id)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> StorageResult<bool> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn scan(&self) -> StorageResult<Vec<StoredEntry>> {
        let mut scanned = Vec::new();
        for (id, path) in self.files()? {
            // A file deleted between listing and reading is skipped
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let entry = serde_json::from_str(&raw).ok();
            if entry.is_none() {
                debug!("Unreadable cache file: {}", path.display());
            }
            scanned.push(StoredEntry {
                id,
                entry,
                size_bytes: raw.len() as u64,
            });
        }
        Ok(scanned)
    }

    fn remove_all(&self) -> StorageResult<usize> {
        let mut removed = 0;
        for (id, _) in self.files()? {
            if self.remove(&id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
