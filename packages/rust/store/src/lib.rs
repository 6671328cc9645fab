//! Per-item game store and catalog artifact.
//!
//! The [`GameStore`] keeps one pretty-printed JSON file per [`Game`], named
//! `<id>.json`, inside a flat directory. The fill pass rewrites individual
//! records; the convert pass also emits the merged catalog artifact via
//! [`write_catalog`].
//!
//! **Write rules:**
//! - Every record write is a whole-file atomic replace (temp + rename), so a
//!   killed run never leaves a half-written record.
//! - Listing is sorted by file name; unreadable entries are logged and
//!   skipped, never fatal.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use meeplevault_shared::{Game, MeepleVaultError, Result};

/// Handle to a per-item store directory.
pub struct GameStore {
    root: PathBuf,
}

impl GameStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| MeepleVaultError::io(&root, e))?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `id`.
    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Write a record, atomically replacing any previous file content.
    pub fn write(&self, game: &Game) -> Result<()> {
        if game.id.is_empty() {
            return Err(MeepleVaultError::validation("record has an empty id"));
        }
        // Ids become file names; a separator would escape the store root.
        if game.id.contains(['/', '\\']) {
            return Err(MeepleVaultError::validation(format!(
                "id '{}' contains a path separator",
                game.id
            )));
        }

        let target = self.record_path(&game.id);
        let temp = self.root.join(format!(".{}.json.tmp", game.id));

        let json = to_pretty_json(game)?;
        std::fs::write(&temp, json).map_err(|e| MeepleVaultError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| MeepleVaultError::io(&target, e))?;

        debug!(id = %game.id, path = %target.display(), "wrote record");
        Ok(())
    }

    /// Read a single record by id.
    pub fn read(&self, id: &str) -> Result<Game> {
        let path = self.record_path(id);
        let content =
            std::fs::read_to_string(&path).map_err(|e| MeepleVaultError::io(&path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            MeepleVaultError::Store(format!("invalid record at {}: {e}", path.display()))
        })
    }

    /// Load all records, in file-name order.
    ///
    /// Entries that are not `.json`, cannot be read, or do not parse as a
    /// [`Game`] are logged and skipped.
    pub fn list(&self) -> Result<Vec<Game>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .map_err(|e| MeepleVaultError::io(&self.root, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut games = Vec::with_capacity(paths.len());
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Game>(&content) {
                    Ok(game) => games.push(game),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unparseable record");
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable record");
                }
            }
        }
        Ok(games)
    }
}

/// Write the merged catalog artifact: one JSON array, input order preserved.
pub fn write_catalog(path: &Path, games: &[Game]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MeepleVaultError::io(parent, e))?;
    }

    let json = to_pretty_json(&games)?;
    std::fs::write(path, json).map_err(|e| MeepleVaultError::io(path, e))?;

    debug!(path = %path.display(), count = games.len(), "wrote catalog");
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MeepleVaultError::Store(format!("JSON serialization failed: {e}")))
}
