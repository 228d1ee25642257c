//! Endpoint configuration for the census sync engine.
//!
//! Provides a unified `SheetConfig` used by every front end to locate the
//! published CSV snapshot (read) and the Apps Script web app (write), plus
//! the fixed list of valid voting centers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Fallback voting center assigned when the source omits one.
pub const DEFAULT_CENTER: &str = "FIBSAL";

/// Fallback voting table assigned when the source omits one.
pub const DEFAULT_TABLE: &str = "Mesa 1";

/// Endpoints and center list required to run a sync cycle.
///
/// The write sink is optional: when `script_url` is absent, status changes
/// degrade to local-only success without any network call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetConfig {
    /// Published spreadsheet CSV sharing link (read snapshot).
    pub csv_url: String,
    /// Deployed web-app endpoint accepting status writes, if any.
    #[serde(default)]
    pub script_url: Option<String>,
    /// Valid voting center names.
    #[serde(default = "default_centers")]
    pub centers: Vec<String>,
}

fn default_centers() -> Vec<String> {
    vec![DEFAULT_CENTER.to_string()]
}

impl SheetConfig {
    /// Build a validated configuration.
    ///
    /// The CSV endpoint must be an HTTP(S) URL that structurally resembles a
    /// published-spreadsheet sharing link; anything else fails fast with
    /// `Error::Configuration` before any network call is attempted.
    pub fn new(csv_url: impl Into<String>, script_url: Option<String>) -> Result<Self> {
        let csv_url = validate_csv_url(csv_url.into())?;
        let script_url = match normalize_text_option(script_url) {
            Some(url) if is_http_url(&url) => Some(url),
            Some(url) => {
                return Err(Error::Configuration(format!(
                    "script endpoint must include http:// or https://: {url}"
                )))
            }
            None => None,
        };

        Ok(Self {
            csv_url,
            script_url,
            centers: default_centers(),
        })
    }

    /// Replace the valid center list.
    #[must_use]
    pub fn with_centers(mut self, centers: Vec<String>) -> Self {
        self.centers = centers;
        self
    }

    /// Load configuration from `VOTOTRACK_CSV_URL` / `VOTOTRACK_SCRIPT_URL`.
    ///
    /// Returns `None` when the CSV URL is unset or blank, so callers can fall
    /// back to a build-provisioned default.
    pub fn from_env() -> Option<Result<Self>> {
        let csv_url = normalize_text_option(std::env::var("VOTOTRACK_CSV_URL").ok())?;
        let script_url = std::env::var("VOTOTRACK_SCRIPT_URL").ok();
        Some(Self::new(csv_url, script_url))
    }

    /// Whether a remote write sink is configured.
    pub const fn has_write_sink(&self) -> bool {
        self.script_url.is_some()
    }
}

fn validate_csv_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Configuration("CSV endpoint must not be empty".to_string()))?;
    if !is_http_url(&url) {
        return Err(Error::Configuration(format!(
            "CSV endpoint must include http:// or https://: {url}"
        )));
    }
    if !url.contains("spreadsheets") {
        return Err(Error::Configuration(
            "CSV endpoint does not look like a published spreadsheet link".to_string(),
        ));
    }
    Ok(url)
}
