//! Reconciliation of fetched snapshots against persisted state.

use serde::{Deserialize, Serialize};

use crate::models::Roster;

/// The only persisted artifact: last-known roster plus last-sync display time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub roster: Roster,
    pub last_sync_at: Option<String>,
}

impl SyncState {
    /// State for a first run: empty roster, never synced.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The fetched roster wholly replaced the cached one.
    Replaced(SyncState),
    /// The fetch returned no records; treated as a transient condition and
    /// the previous state kept unchanged.
    SkippedEmpty(SyncState),
}

impl ReconcileOutcome {
    pub fn state(&self) -> &SyncState {
        match self {
            Self::Replaced(state) | Self::SkippedEmpty(state) => state,
        }
    }

    pub fn into_state(self) -> SyncState {
        match self {
            Self::Replaced(state) | Self::SkippedEmpty(state) => state,
        }
    }

    pub const fn replaced(&self) -> bool {
        matches!(self, Self::Replaced(_))
    }
}

/// Merge a freshly fetched roster into the previous state.
///
/// Full replacement: the fetched roster replaces the cached one and
/// `last_sync_at` is set to `now`. An empty fetch skips the replacement and
/// returns the previous state untouched. Local edits applied between fetches
/// are overwritten unless the remote snapshot already absorbed them; that gap
/// is part of the model, not a bug.
pub fn reconcile(prev: SyncState, fetched: Roster, now: &str) -> ReconcileOutcome {
    if fetched.is_empty() {
        tracing::warn!("Fetched roster is empty; keeping previous state");
        return ReconcileOutcome::SkippedEmpty(prev);
    }

    ReconcileOutcome::Replaced(SyncState {
        roster: fetched,
        last_sync_at: Some(now.to_string()),
    })
}

/// Operator-facing sync timestamp, local time with second granularity.
pub fn sync_timestamp_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
