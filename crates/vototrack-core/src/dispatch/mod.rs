//! Optimistic status mutation plus best-effort remote propagation.

use std::time::Duration;

use serde::Serialize;

use crate::config::SheetConfig;
use crate::error::{Error, Result};
use crate::models::{Roster, Voter, VoterId};

/// Delay used by the local-only no-op sink, mirroring a network round-trip.
const LOCAL_SINK_DELAY: Duration = Duration::from_millis(300);

/// What is known about the remote side after a dispatch.
///
/// The write sink is a write-only transport: a successfully issued request
/// yields `Unconfirmed`, never `Confirmed`, because the remote outcome is
/// unobservable. The local-only no-op sink is `Confirmed` by definition.
/// Callers decide whether `Unconfirmed` counts as success; the dispatcher
/// itself treats it as success and advances local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Confirmed,
    Unconfirmed,
    Failed,
}

/// Outcome of one dispatch: whether the local roster was updated, what the
/// remote delivery reported, and the updated record when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub applied: bool,
    pub outcome: DeliveryOutcome,
    pub record: Option<Voter>,
}

/// Wire payload for the write sink. Field names preserved for compatibility
/// with the external endpoint.
#[derive(Debug, Serialize)]
struct VotePayload {
    id: i64,
    #[serde(rename = "hasVoted")]
    has_voted: bool,
    #[serde(rename = "horaVoto")]
    hora_voto: Option<String>,
}

/// Applies a single status change to the roster and propagates it remotely.
#[derive(Clone)]
pub struct VoteDispatcher {
    script_url: Option<String>,
    client: reqwest::Client,
}

impl VoteDispatcher {
    pub fn new(config: &SheetConfig) -> Result<Self> {
        Ok(Self {
            script_url: config.script_url.clone(),
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Mark the record with `id` as voted / not voted.
    ///
    /// The vote time is recomputed on every call: repeated `has_voted = true`
    /// dispatches refresh the timestamp to "last time this state was set".
    /// The roster is only modified when delivery did not fail; on failure the
    /// caller sees `applied = false` and unchanged state, and may retry.
    ///
    /// Concurrent dispatches for the same id are last-write-wins; no
    /// per-record locking is enforced.
    pub async fn dispatch(
        &self,
        roster: &mut Roster,
        id: VoterId,
        has_voted: bool,
    ) -> Result<DispatchResult> {
        if roster.get(id).is_none() {
            return Err(Error::NotFound(id.to_string()));
        }

        let hora_voto = has_voted.then(vote_time_now);
        let outcome = self.deliver(id, has_voted, hora_voto.clone()).await;

        if outcome == DeliveryOutcome::Failed {
            tracing::warn!(%id, "Vote status delivery failed; local state unchanged");
            return Ok(DispatchResult {
                applied: false,
                outcome,
                record: None,
            });
        }

        let mut updated = roster
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        updated.ha_votado = has_voted;
        updated.hora_voto = hora_voto;
        let record = roster.replace(updated).cloned();

        tracing::info!(%id, has_voted, "Vote status applied");
        Ok(DispatchResult {
            applied: true,
            outcome,
            record,
        })
    }

    async fn deliver(
        &self,
        id: VoterId,
        has_voted: bool,
        hora_voto: Option<String>,
    ) -> DeliveryOutcome {
        let Some(url) = &self.script_url else {
            // Local-only no-op sink: automatic success after a short delay.
            tokio::time::sleep(LOCAL_SINK_DELAY).await;
            tracing::debug!(%id, "No write sink configured; local-only update");
            return DeliveryOutcome::Confirmed;
        };

        let payload = VotePayload {
            id: id.0,
            has_voted,
            hora_voto,
        };

        // Fire-and-forget: the sink's transport does not let us read a
        // meaningful response, so an issued request counts as unconfirmed
        // success regardless of status.
        match self.client.post(url).json(&payload).send().await {
            Ok(_) => DeliveryOutcome::Unconfirmed,
            Err(error) => {
                tracing::warn!(%id, "Write sink request failed: {error}");
                DeliveryOutcome::Failed
            }
        }
    }
}

/// Vote timestamp with hour:minute granularity, local time.
pub fn vote_time_now() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
