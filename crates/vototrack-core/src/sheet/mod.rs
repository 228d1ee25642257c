//! Remote snapshot fetcher for the published spreadsheet CSV.

use crate::config::SheetConfig;
use crate::error::{Error, Result};
use crate::models::{RawRow, Roster, Voter};
use crate::util::compact_text;

/// One fetched snapshot: the normalized roster plus how many rows were
/// dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSnapshot {
    pub roster: Roster,
    pub rejected_rows: usize,
}

/// HTTP client for the read-side spreadsheet endpoint.
#[derive(Clone)]
pub struct SheetClient {
    config: SheetConfig,
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(config: SheetConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: reqwest::Client::builder().build()?,
        })
    }

    pub const fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Fetch the current remote snapshot and normalize every row.
    ///
    /// The request carries a cache-busting `t` parameter so every fetch
    /// observes the freshest remote state. Non-2xx responses and network
    /// failures surface as transport errors; an un-tokenizable payload is a
    /// parse error. Both leave previously cached state untouched upstream.
    pub async fn fetch_roster(&self) -> Result<SheetSnapshot> {
        let url = cache_busted_url(&self.config.csv_url, unix_timestamp_millis());
        tracing::debug!("Fetching roster snapshot from sheet");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus {
                status,
                body: compact_text(&body),
            });
        }

        let payload = response.text().await?;
        let snapshot = parse_snapshot(&payload)?;
        if snapshot.rejected_rows > 0 {
            tracing::warn!(
                rejected = snapshot.rejected_rows,
                "Dropped rows with unparsable ids during normalization"
            );
        }
        tracing::info!(records = snapshot.roster.len(), "Roster snapshot fetched");
        Ok(snapshot)
    }
}

/// Parse a raw CSV payload into a normalized snapshot.
///
/// Public for testability — callers can exercise parsing without network
/// access. Rows in source order; rows whose id fails to parse are dropped
/// and counted.
pub fn parse_snapshot(payload: &str) -> Result<SheetSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(payload.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    let mut rejected_rows = 0_usize;
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let raw = RawRow::from_pairs(headers.iter().map(String::as_str).zip(row.iter()));
        match Voter::from_row(&raw) {
            Ok(voter) => records.push(voter),
            Err(error) => {
                tracing::debug!("Rejected row: {error}");
                rejected_rows += 1;
            }
        }
    }

    Ok(SheetSnapshot {
        roster: Roster::from_records(records),
        rejected_rows,
    })
}

fn cache_busted_url(base: &str, timestamp_millis: i64) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}t={timestamp_millis}")
}

fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoterId;
    use pretty_assertions::assert_eq;

    #[test]
    fn cache_busted_url_appends_parameter() {
        assert_eq!(
            cache_busted_url("https://x/pub?output=csv", 42),
            "https://x/pub?output=csv&t=42"
        );
        assert_eq!(cache_busted_url("https://x/pub", 42), "https://x/pub?t=42");
    }

    #[test]
    fn parse_snapshot_normalizes_rows_in_order() {
        let payload = "id,nombre,havotado,horavoto\n1,Ana,si,10:05\n2,Luis,,\n";
        let snapshot = parse_snapshot(payload).unwrap();

        assert_eq!(snapshot.roster.len(), 2);
        assert_eq!(snapshot.rejected_rows, 0);

        let ana = snapshot.roster.get(VoterId(1)).unwrap();
        assert!(ana.ha_votado);
        assert_eq!(ana.hora_voto.as_deref(), Some("10:05"));

        let luis = snapshot.roster.get(VoterId(2)).unwrap();
        assert!(!luis.ha_votado);
        assert_eq!(luis.hora_voto, None);
    }

    #[test]
    fn parse_snapshot_trims_and_lowercases_headers() {
        let payload = " ID , Nombre ,AfiliadoUGT\n5,Marta,SI\n";
        let snapshot = parse_snapshot(payload).unwrap();
        let marta = snapshot.roster.get(VoterId(5)).unwrap();
        assert_eq!(marta.nombre, "Marta");
        assert!(marta.afiliado_ugt);
    }

    #[test]
    fn parse_snapshot_drops_and_counts_bad_ids() {
        let payload = "id,nombre\nabc,Bad\n1,Ana\n,NoId\n";
        let snapshot = parse_snapshot(payload).unwrap();
        assert_eq!(snapshot.roster.len(), 1);
        assert_eq!(snapshot.rejected_rows, 2);
    }

    #[test]
    fn parse_snapshot_skips_blank_lines() {
        let payload = "id,nombre\n1,Ana\n,\n2,Luis\n";
        let snapshot = parse_snapshot(payload).unwrap();
        assert_eq!(snapshot.roster.len(), 2);
        assert_eq!(snapshot.rejected_rows, 0);
    }

    #[test]
    fn parse_snapshot_duplicate_ids_last_wins() {
        let payload = "id,nombre\n1,Old\n2,Luis\n1,New\n";
        let snapshot = parse_snapshot(payload).unwrap();
        assert_eq!(snapshot.roster.len(), 2);
        assert_eq!(snapshot.roster.get(VoterId(1)).unwrap().nombre, "New");
    }

    #[test]
    fn parse_snapshot_empty_payload_is_empty_roster() {
        let snapshot = parse_snapshot("id,nombre\n").unwrap();
        assert!(snapshot.roster.is_empty());
    }

    /// Serve a single canned HTTP response on a loopback port.
    async fn one_shot_server(response: &'static [u8]) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response).await;
        });
        addr
    }

    #[tokio::test]
    async fn non_success_status_is_remote_status_error() {
        let addr = one_shot_server(
            b"HTTP/1.1 500 Internal Server Error\r\n\
              content-length: 5\r\n\
              connection: close\r\n\r\noops!",
        )
        .await;

        let config = SheetConfig::new(
            format!("http://{addr}/spreadsheets/pub?output=csv"),
            None,
        )
        .unwrap();
        let client = SheetClient::new(config).unwrap();

        let error = client.fetch_roster().await.unwrap_err();
        match error {
            Error::RemoteStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops!");
            }
            other => panic!("expected RemoteStatus, got {other}"),
        }
    }

    #[tokio::test]
    async fn successful_fetch_normalizes_payload() {
        let addr = one_shot_server(
            b"HTTP/1.1 200 OK\r\n\
              content-length: 27\r\n\
              connection: close\r\n\r\nid,nombre,havotado\n1,Ana,si",
        )
        .await;

        let config = SheetConfig::new(
            format!("http://{addr}/spreadsheets/pub?output=csv"),
            None,
        )
        .unwrap();
        let client = SheetClient::new(config).unwrap();

        let snapshot = client.fetch_roster().await.unwrap();
        assert_eq!(snapshot.roster.len(), 1);
        assert!(snapshot.roster.get(VoterId(1)).unwrap().ha_votado);
    }
}
