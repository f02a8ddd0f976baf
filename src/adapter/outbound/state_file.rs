//! Tracker cursor persisted as a small JSON file.
//!
//! Lets a restarted bot resume after the last block it announced instead of
//! jumping to the tip.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::port::{CursorStore, SavedCursor};

/// Current state file format version.
const STATE_VERSION: u32 = 1;

/// On-disk layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub height: u64,
    pub hash: String,
    pub updated_at: DateTime<Utc>,
}

/// [`CursorStore`] backed by a JSON file.
pub struct StateFileStore {
    path: PathBuf,
}

impl StateFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CursorStore for StateFileStore {
    fn load(&self) -> Result<Option<SavedCursor>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let state: StateFile = serde_json::from_str(&json)?;
        if state.version != STATE_VERSION {
            return Err(Error::Parse(format!(
                "unsupported state file version {} in {}",
                state.version,
                self.path.display()
            )));
        }

        Ok(Some(SavedCursor {
            height: state.height,
            hash: state.hash,
        }))
    }

    /// Write the cursor atomically.
    ///
    /// Uses write-to-temp-then-rename. Creates the parent directory if it
    /// doesn't exist.
    fn save(&self, cursor: &SavedCursor) -> Result<()> {
        let state = StateFile {
            version: STATE_VERSION,
            height: cursor.height,
            hash: cursor.hash.clone(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        debug!(height = cursor.height, path = %self.path.display(), "Saved tracker state");
        Ok(())
    }
}
