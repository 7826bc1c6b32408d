/// Local track storage backed by redb.
///
/// Uses a single redb database file with one table:
/// - `tracks`: bincode-serialized `StoredTrack` entries keyed by track name
///
/// Only the editable content is stored. Renderer layers and the transient
/// routing/save flags belong to a live session and are never persisted.
use std::path::Path;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::document::{TrackContent, TrackDocument};

/// Track table: track name → bincode-serialized StoredTrack.
const TRACKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tracks");

/// A track as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrack {
    pub content: TrackContent,
    /// Last save time, milliseconds since the Unix epoch (UTC).
    pub updated_at_ms: i64,
}

impl StoredTrack {
    /// Rebuilds a document with no layers and all flags cleared.
    pub fn into_document(self) -> TrackDocument {
        TrackDocument::new(self.content)
    }
}

/// Storage for tracks created on this machine.
pub struct LocalTrackStore {
    db: Database,
}

impl std::fmt::Debug for LocalTrackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTrackStore").finish()
    }
}

impl LocalTrackStore {
    /// Opens or creates the track database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("local-tracks.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open track database: {}", db_path.display()))?;

        // Ensure the table exists
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(TRACKS_TABLE)
                .context("Failed to create tracks table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Self { db })
    }

    /// Saves the content of `doc` under its name, replacing any previous
    /// version. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the track has no name or the write fails.
    pub fn save_track(&self, doc: &TrackDocument) -> Result<StoredTrack> {
        let name = doc.name();
        anyhow::ensure!(!name.is_empty(), "Cannot save a track without a name");

        let stored = StoredTrack {
            content: doc.content.clone(),
            updated_at_ms: chrono::Utc::now().timestamp_millis(),
        };
        let bytes = bincode::serialize(&stored).context("Failed to serialize track")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(TRACKS_TABLE)
                .context("Failed to open tracks table")?;
            table
                .insert(name, bytes.as_slice())
                .context("Failed to insert track")?;
        }
        write_txn.commit().context("Failed to commit track")?;
        tracing::debug!("Saved local track '{name}'");
        Ok(stored)
    }

    /// Loads a track by name, or `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_track(&self, name: &str) -> Result<Option<StoredTrack>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(TRACKS_TABLE)
            .context("Failed to open tracks table")?;

        match table.get(name).context("Failed to read track")? {
            Some(guard) => {
                let stored: StoredTrack = bincode::deserialize(guard.value())
                    .context("Failed to deserialize track")?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// Deletes a track. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete_track(&self, name: &str) -> Result<bool> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        let existed = {
            let mut table = write_txn
                .open_table(TRACKS_TABLE)
                .context("Failed to open tracks table")?;
            let removed = table.remove(name).context("Failed to remove track")?;
            removed.is_some()
        };
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(existed)
    }

    /// Lists the names of all stored tracks in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_tracks(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(TRACKS_TABLE)
            .context("Failed to open tracks table")?;

        let mut names = Vec::new();
        for entry in table.iter().context("Failed to iterate tracks table")? {
            let (key_guard, _) = entry.context("Failed to read track entry")?;
            names.push(key_guard.value().to_string());
        }
        Ok(names)
    }
}
