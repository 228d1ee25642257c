//! Voter record model and row normalization

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CENTER, DEFAULT_TABLE};
use crate::error::{Error, Result};

/// Stable identity of one roster entrant.
///
/// Assigned by the remote source, never generated locally. Two records with
/// the same id denote the same entrant across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(pub i64);

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VoterId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// One roster entrant: identity, contact, affiliation, and turnout status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub id: VoterId,
    pub nombre: String,
    pub apellido: String,
    pub apellido2: String,
    pub telefono: String,
    pub email: String,
    pub afiliado_ugt: bool,
    pub ha_votado: bool,
    /// Time-of-vote display string; `Some` exactly while `ha_votado` is true
    /// for records produced by the dispatcher. Passed through as-is from the
    /// source during normalization.
    pub hora_voto: Option<String>,
    pub centro_votacion: String,
    pub mesa_votacion: String,
}

impl Voter {
    /// Full name used for display and search.
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.nombre, self.apellido, self.apellido2)
            .trim()
            .to_string()
    }

    /// Normalize one raw tabular row into a validated record.
    ///
    /// Rows whose `id` does not parse to an integer are rejected; callers
    /// drop them and report the count rather than carrying a sentinel id.
    pub fn from_row(row: &RawRow) -> Result<Self> {
        let raw_id = row.get("id").unwrap_or_default();
        let id = raw_id
            .parse::<VoterId>()
            .map_err(|_| Error::Validation(format!("id {raw_id:?} is not an integer")))?;

        Ok(Self {
            id,
            nombre: row.text("nombre"),
            apellido: row.text("apellido"),
            apellido2: row.text("apellido2"),
            telefono: row.text("telefono"),
            email: row.text("email"),
            afiliado_ugt: normalize_bool(row.get("afiliadougt").unwrap_or_default()),
            ha_votado: normalize_bool(row.get("havotado").unwrap_or_default()),
            hora_voto: row.optional_text("horavoto"),
            centro_votacion: row
                .optional_text("centrovotacion")
                .unwrap_or_else(|| DEFAULT_CENTER.to_string()),
            mesa_votacion: row
                .optional_text("mesavotacion")
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        })
    }
}

/// One raw tabular row: lower-cased, trimmed column names mapped to raw values.
#[derive(Debug, Default, Clone)]
pub struct RawRow(HashMap<String, String>);

impl RawRow {
    /// Build a row from `(header, value)` pairs, normalizing the headers.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
                .collect(),
        )
    }

    /// Raw value for a column, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Text field value, defaulting to an empty string when absent.
    fn text(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().trim().to_string()
    }

    /// Trimmed value when present and non-blank, else `None`.
    fn optional_text(&self, column: &str) -> Option<String> {
        let value = self.get(column)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// Normalize a boolean-ish source value.
///
/// Trimmed, case-insensitive `"si"` or `"true"` means true; everything else
/// (including blank and `"no"`) means false.
pub fn normalize_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "si" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn normalize_bool_accepts_si_variants() {
        assert!(normalize_bool("si"));
        assert!(normalize_bool("SI"));
        assert!(normalize_bool("Si "));
        assert!(normalize_bool("true"));
        assert!(normalize_bool("TRUE"));
    }

    #[test]
    fn normalize_bool_rejects_everything_else() {
        assert!(!normalize_bool("no"));
        assert!(!normalize_bool("NO"));
        assert!(!normalize_bool(""));
        assert!(!normalize_bool("false"));
        assert!(!normalize_bool("yes"));
    }

    #[test]
    fn from_row_fills_defaults() {
        let voter = Voter::from_row(&row(&[("id", "7"), ("nombre", "Ana")])).unwrap();
        assert_eq!(voter.id, VoterId(7));
        assert_eq!(voter.nombre, "Ana");
        assert_eq!(voter.apellido, "");
        assert_eq!(voter.telefono, "");
        assert!(!voter.afiliado_ugt);
        assert!(!voter.ha_votado);
        assert_eq!(voter.hora_voto, None);
        assert_eq!(voter.centro_votacion, DEFAULT_CENTER);
        assert_eq!(voter.mesa_votacion, DEFAULT_TABLE);
    }

    #[test]
    fn from_row_normalizes_headers_and_booleans() {
        let voter = Voter::from_row(&row(&[
            (" ID ", "3"),
            ("Nombre", "Luis"),
            ("AfiliadoUGT", "SI"),
            ("HaVotado", "si"),
            ("HoraVoto", "09:15"),
        ]))
        .unwrap();
        assert!(voter.afiliado_ugt);
        assert!(voter.ha_votado);
        assert_eq!(voter.hora_voto.as_deref(), Some("09:15"));
    }

    // Policy: unparsable ids are rejected (dropped by the fetcher), not
    // retained with a sentinel.
    #[test]
    fn from_row_rejects_unparsable_id() {
        let error = Voter::from_row(&row(&[("id", "abc"), ("nombre", "X")])).unwrap_err();
        assert!(matches!(error, Error::Validation(_)));

        assert!(Voter::from_row(&row(&[("nombre", "sin id")])).is_err());
    }

    #[test]
    fn from_row_is_deterministic() {
        let input = row(&[("id", "1"), ("nombre", "Ana"), ("havotado", "si")]);
        let first = Voter::from_row(&input).unwrap();
        let second = Voter::from_row(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let mut voter = Voter::from_row(&row(&[("id", "1"), ("nombre", "Ana")])).unwrap();
        assert_eq!(voter.full_name(), "Ana");
        voter.apellido = "García".to_string();
        assert_eq!(voter.full_name(), "Ana García");
    }
}
