//! Durable record of the URLs already announced.
//!
//! The file is a single JSON array of strings in insertion order. Only the
//! most recent [`MAX_PERSISTED`] entries are written, so the file stays
//! bounded no matter how long the bot runs.
//!
//! Persistence is best effort in both directions: a missing or unreadable
//! file loads as an empty set (re-announcing is preferred over refusing to
//! start), and a failed write is logged and dropped.

use indexmap::IndexSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Announced URLs in the order they were first announced.
pub type AnnouncedSet = IndexSet<String>;

/// Upper bound on the number of identifiers written to disk.
pub const MAX_PERSISTED: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid store contents: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct PostedNewsStore {
    path: PathBuf,
    capacity: usize,
}

impl PostedNewsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: MAX_PERSISTED,
        }
    }

    /// Override the number of entries kept on save.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the announced set, degrading to an empty set on any failure.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> AnnouncedSet {
        match self.try_load() {
            Ok(set) => {
                info!(count = set.len(), "Loaded previously posted news items");
                set
            }
            Err(e) => {
                error!(error = %e, "Error loading posted news; starting empty");
                AnnouncedSet::new()
            }
        }
    }

    /// Load the announced set. A missing file is an empty set, not an error.
    pub fn try_load(&self) -> Result<AnnouncedSet, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No posted news file yet");
                return Ok(AnnouncedSet::new());
            }
            Err(e) => return Err(e.into()),
        };
        let urls: Vec<String> = serde_json::from_str(&data)?;
        Ok(urls.into_iter().collect())
    }

    /// Persist the newest entries of `set`, logging instead of failing.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, set: &AnnouncedSet) {
        match self.try_save(set) {
            Ok(written) => info!(written, total = set.len(), "Saved posted news"),
            Err(e) => error!(error = %e, "Error saving posted news"),
        }
    }

    /// Write the newest `capacity` entries of `set` atomically.
    ///
    /// Returns the number of entries written.
    pub fn try_save(&self, set: &AnnouncedSet) -> Result<usize, StoreError> {
        let skip = set.len().saturating_sub(self.capacity);
        let recent: Vec<&String> = set.iter().skip(skip).collect();
        let json = serde_json::to_string_pretty(&recent)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(recent.len())
    }
}
