//! Single-slot durable storage for the tournament state
//!
//! The slot is one JSON file. Writes go to a sibling temporary file that is
//! synced and then renamed over the slot, so a crash mid-write leaves either
//! the old document or the new one, never a torn file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TournamentError};
use crate::state::TournamentState;

/// File-backed state slot
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the slot
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current tournament, or `None` when the slot is empty.
    ///
    /// A file that exists but cannot be parsed, or parses into a document
    /// that breaks the state invariants, is reported as corruption.
    pub fn load(&self) -> Result<Option<TournamentState>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No state at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(TournamentError::io(&self.path, e)),
        };

        // Bytes, not a String: invalid UTF-8 is corruption, not an I/O failure
        let state: TournamentState = serde_json::from_slice(&content)
            .map_err(|e| TournamentError::corrupt(&self.path, e.to_string()))?;
        state
            .check_invariants()
            .map_err(|reason| TournamentError::corrupt(&self.path, reason))?;

        tracing::debug!(
            "Loaded tournament from {}: {} agents, {} evaluations",
            self.path.display(),
            state.agent_count,
            state.total_evaluations
        );
        Ok(Some(state))
    }

    /// Atomically replace the slot contents with `state`
    pub fn save(&self, state: &TournamentState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TournamentError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.write_all(b"\n")?;
            file.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp);
            return Err(TournamentError::io(&tmp, e));
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            TournamentError::io(&self.path, e)
        })?;

        tracing::debug!("Saved tournament to {}", self.path.display());
        Ok(())
    }

    /// Empty the slot. Returns whether a state file was removed.
    pub fn clear(&self) -> Result<bool> {
        let _ = fs::remove_file(self.temp_path());
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TournamentError::io(&self.path, e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
