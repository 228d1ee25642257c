//! Roster collection model

use serde::{Deserialize, Serialize};

use crate::models::voter::{Voter, VoterId};

/// The full ordered collection of entrant records, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<Voter>);

/// Turnout counts for a (possibly scoped) roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Turnout {
    pub total: usize,
    pub voted: usize,
}

impl Roster {
    /// Build a roster from records in source order, deduplicating by id.
    ///
    /// When the source contains duplicate ids the last-seen record wins;
    /// it keeps the position of the first occurrence so output order still
    /// follows the source.
    pub fn from_records(records: Vec<Voter>) -> Self {
        let mut voters: Vec<Voter> = Vec::with_capacity(records.len());
        for record in records {
            if let Some(existing) = voters.iter_mut().find(|v| v.id == record.id) {
                *existing = record;
            } else {
                voters.push(record);
            }
        }
        Self(voters)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Voter> {
        self.0.iter()
    }

    /// Look up a record by id.
    pub fn get(&self, id: VoterId) -> Option<&Voter> {
        self.0.iter().find(|v| v.id == id)
    }

    /// Replace the record with the same id, returning the new value.
    ///
    /// Returns `None` when no record carries that id; the roster is left
    /// unchanged in that case.
    pub fn replace(&mut self, record: Voter) -> Option<&Voter> {
        let slot = self.0.iter_mut().find(|v| v.id == record.id)?;
        *slot = record;
        Some(slot)
    }

    /// Total vs voted counts.
    pub fn turnout(&self) -> Turnout {
        Turnout {
            total: self.0.len(),
            voted: self.0.iter().filter(|v| v.ha_votado).count(),
        }
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Voter;
    type IntoIter = std::slice::Iter<'a, Voter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Voter> for Roster {
    fn from_iter<I: IntoIterator<Item = Voter>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::voter::RawRow;
    use pretty_assertions::assert_eq;

    fn voter(id: i64, nombre: &str) -> Voter {
        Voter::from_row(&RawRow::from_pairs([
            ("id", id.to_string()),
            ("nombre", nombre.to_string()),
        ]))
        .unwrap()
    }

    #[test]
    fn from_records_keeps_source_order() {
        let roster = Roster::from_records(vec![voter(3, "C"), voter(1, "A"), voter(2, "B")]);
        let ids: Vec<i64> = roster.iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn duplicate_ids_last_wins_first_position() {
        let roster = Roster::from_records(vec![voter(1, "old"), voter(2, "B"), voter(1, "new")]);
        assert_eq!(roster.len(), 2);
        let ids: Vec<i64> = roster.iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(roster.get(VoterId(1)).unwrap().nombre, "new");
    }

    #[test]
    fn replace_updates_matching_id_only() {
        let mut roster = Roster::from_records(vec![voter(1, "A"), voter(2, "B")]);
        let mut updated = voter(2, "B2");
        updated.ha_votado = true;
        assert!(roster.replace(updated).is_some());
        assert!(roster.get(VoterId(2)).unwrap().ha_votado);

        assert!(roster.replace(voter(9, "missing")).is_none());
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn turnout_counts_voted() {
        let mut a = voter(1, "A");
        a.ha_votado = true;
        let roster = Roster::from_records(vec![a, voter(2, "B"), voter(3, "C")]);
        assert_eq!(roster.turnout(), Turnout { total: 3, voted: 1 });
    }
}
