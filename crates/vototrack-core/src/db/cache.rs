//! Sync state repository implementation

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::sync::SyncState;

const ROSTER_KEY: &str = "roster";
const LAST_SYNC_KEY: &str = "last_sync";

/// Trait for durable sync-state storage.
///
/// Injected into components rather than reached through ambient globals, so
/// tests can substitute an in-memory cache.
pub trait SyncStateRepository {
    /// Load the persisted state, or an empty state on first run.
    fn load(&self) -> Result<SyncState>;

    /// Persist the full state, replacing whatever was stored before.
    fn save(&self, state: &SyncState) -> Result<()>;
}

/// SQLite implementation of `SyncStateRepository`.
///
/// Two key-value entries: the roster as JSON and the last-sync display
/// string. Not safe for multi-process writers; exactly one operator session
/// is expected per cache file.
pub struct SqliteSyncStateRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncStateRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_entry(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM sync_state WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_entry(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_state (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear_entry(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sync_state WHERE key = ?", params![key])?;
        Ok(())
    }
}

impl SyncStateRepository for SqliteSyncStateRepository<'_> {
    fn load(&self) -> Result<SyncState> {
        let Some(roster_json) = self.get_entry(ROSTER_KEY)? else {
            return Ok(SyncState::empty());
        };

        Ok(SyncState {
            roster: serde_json::from_str(&roster_json)?,
            last_sync_at: self.get_entry(LAST_SYNC_KEY)?,
        })
    }

    fn save(&self, state: &SyncState) -> Result<()> {
        self.set_entry(ROSTER_KEY, &serde_json::to_string(&state.roster)?)?;
        match &state.last_sync_at {
            Some(timestamp) => self.set_entry(LAST_SYNC_KEY, timestamp)?,
            None => self.clear_entry(LAST_SYNC_KEY)?,
        }
        Ok(())
    }
}
