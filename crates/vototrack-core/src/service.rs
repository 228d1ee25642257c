//! Census service: one handle tying cache, fetcher, and dispatcher together.

use std::path::Path;

use crate::config::SheetConfig;
use crate::db::{Database, SqliteSyncStateRepository, SyncStateRepository};
use crate::dispatch::{DispatchResult, VoteDispatcher};
use crate::error::Result;
use crate::models::VoterId;
use crate::sheet::SheetClient;
use crate::sync::{reconcile, sync_timestamp_now, ReconcileOutcome, SyncState};

/// Orchestrates sync cycles and status mutations over one local cache.
///
/// Single-writer: exactly one service instance is expected per cache file.
pub struct CensusService {
    db: Database,
    sheet: SheetClient,
    dispatcher: VoteDispatcher,
}

impl CensusService {
    /// Open the service over a cache file at the given path.
    pub fn open(db_path: impl AsRef<Path>, config: SheetConfig) -> Result<Self> {
        let db = Database::open(db_path)?;
        Self::with_database(db, config)
    }

    /// Open the service over an in-memory cache (primarily for tests).
    pub fn open_in_memory(config: SheetConfig) -> Result<Self> {
        Self::with_database(Database::open_in_memory()?, config)
    }

    fn with_database(db: Database, config: SheetConfig) -> Result<Self> {
        let dispatcher = VoteDispatcher::new(&config)?;
        let sheet = SheetClient::new(config)?;
        Ok(Self {
            db,
            sheet,
            dispatcher,
        })
    }

    pub const fn config(&self) -> &SheetConfig {
        self.sheet.config()
    }

    /// Last persisted state, or an empty state on first run.
    pub fn load_state(&self) -> Result<SyncState> {
        self.repository().load()
    }

    /// Fetch the remote snapshot and reconcile it into the cache.
    ///
    /// Any fetch failure leaves the cache untouched. There is no sequencing
    /// token: if two refreshes race, the later completion wins when writing
    /// the cache, and a mutation issued while a fetch is in flight may be
    /// clobbered by the fetch's completion.
    pub async fn refresh(&self) -> Result<ReconcileOutcome> {
        let prev = self.load_state()?;
        let snapshot = self.sheet.fetch_roster().await?;
        let outcome = reconcile(prev, snapshot.roster, &sync_timestamp_now());

        if outcome.replaced() {
            self.repository().save(outcome.state())?;
            tracing::info!(
                records = outcome.state().roster.len(),
                "Roster reconciled and persisted"
            );
        }

        Ok(outcome)
    }

    /// Run the automatic first sync, but only when the cache is empty.
    ///
    /// Subsequent syncs happen solely on explicit operator request; nothing
    /// is scheduled on a timer.
    pub async fn ensure_initial_sync(&self) -> Result<Option<ReconcileOutcome>> {
        if self.load_state()?.roster.is_empty() {
            tracing::info!("Local cache empty; running initial sync");
            return self.refresh().await.map(Some);
        }
        Ok(None)
    }

    /// Mark a voter as voted / not voted and persist when applied.
    pub async fn set_vote_status(&self, id: VoterId, has_voted: bool) -> Result<DispatchResult> {
        let mut state = self.load_state()?;
        let result = self
            .dispatcher
            .dispatch(&mut state.roster, id, has_voted)
            .await?;

        if result.applied {
            self.repository().save(&state)?;
        }

        Ok(result)
    }

    fn repository(&self) -> SqliteSyncStateRepository<'_> {
        SqliteSyncStateRepository::new(self.db.connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawRow, Roster, Voter};
    use pretty_assertions::assert_eq;

    const CSV_URL: &str = "https://docs.example.com/spreadsheets/d/e/abc/pub?output=csv";

    fn service() -> CensusService {
        let config = SheetConfig::new(CSV_URL, None).unwrap();
        CensusService::open_in_memory(config).unwrap()
    }

    fn seeded_state() -> SyncState {
        let roster: Roster = [1_i64, 2]
            .iter()
            .map(|id| Voter::from_row(&RawRow::from_pairs([("id", id.to_string())])).unwrap())
            .collect();
        SyncState {
            roster,
            last_sync_at: Some("09:00:00".to_string()),
        }
    }

    #[test]
    fn first_run_state_is_empty() {
        let service = service();
        let state = service.load_state().unwrap();
        assert!(state.roster.is_empty());
        assert_eq!(state.last_sync_at, None);
    }

    #[tokio::test]
    async fn initial_sync_skipped_when_cache_populated() {
        let service = service();
        service.repository().save(&seeded_state()).unwrap();

        let outcome = service.ensure_initial_sync().await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn set_vote_status_persists_applied_change() {
        let service = service();
        service.repository().save(&seeded_state()).unwrap();

        let result = service.set_vote_status(VoterId(2), true).await.unwrap();
        assert!(result.applied);

        let reloaded = service.load_state().unwrap();
        let record = reloaded.roster.get(VoterId(2)).unwrap();
        assert!(record.ha_votado);
        assert!(record.hora_voto.is_some());
        // The sync timestamp is owned by reconciliation, not dispatch.
        assert_eq!(reloaded.last_sync_at.as_deref(), Some("09:00:00"));
    }

    #[tokio::test]
    async fn set_vote_status_unknown_id_errors() {
        let service = service();
        service.repository().save(&seeded_state()).unwrap();

        assert!(service.set_vote_status(VoterId(99), true).await.is_err());
    }
}
