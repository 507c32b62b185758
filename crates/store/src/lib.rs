//! File-backed span-state persistence.
//!
//! Each path is a single-writer, single-reader handoff slot between two
//! unrelated process lifetimes. There is no locking, versioning, or
//! staleness detection; the writer and the eventual reader are assumed never
//! to race on the same location.

use std::fs;
use std::path::{Path, PathBuf};

use spanstitch_core::state::SpanState;
use spanstitch_core::{Result, StitchError};

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the full record in one shot: serialize, write a sibling temp
    /// file, rename into place. A reader never observes a partial record.
    pub fn save(&self, state: &SpanState) -> Result<()> {
        let payload = serde_json::to_vec_pretty(state)
            .map_err(|e| StitchError::Record(format!("failed encoding span state: {e}")))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, &payload)
            .map_err(|e| StitchError::Io(format!("failed writing {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StitchError::Io(format!(
                "failed moving {} into {}: {e}",
                tmp.display(),
                self.path.display()
            ))
        })?;

        tracing::debug!(path = %self.path.display(), bytes = payload.len(), "wrote span state");
        Ok(())
    }

    pub fn load(&self) -> Result<SpanState> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StitchError::Io(format!("failed reading {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| StitchError::Record(format!("{}: {e}", self.path.display())))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
