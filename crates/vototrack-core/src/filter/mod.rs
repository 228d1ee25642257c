//! Pure roster visibility and filtering functions.

use crate::models::{Roster, Scope, Voter};
use crate::util::fold_text;

/// The subset of the roster visible to an operator scope.
///
/// Unrestricted scopes see the full roster; a center-bound scope sees only
/// records assigned to that center. Pure and idempotent.
pub fn visible_to(roster: &Roster, scope: &Scope) -> Roster {
    match scope {
        Scope::All => roster.iter().cloned().collect(),
        Scope::Center(center) => roster
            .iter()
            .filter(|v| v.centro_votacion == *center)
            .cloned()
            .collect(),
    }
}

/// Conjunctive narrowing predicates applied after scope restriction.
///
/// Each predicate narrows independently; the result does not depend on the
/// order they are applied in.
#[derive(Debug, Clone, Default)]
pub struct RosterFilter {
    /// Free-text search over name, email, and phone.
    pub search: Option<String>,
    /// `Some(true)` keeps affiliated records only, `Some(false)` the rest.
    pub affiliated: Option<bool>,
    /// `Some(true)` keeps records that have voted, `Some(false)` the rest.
    pub voted: Option<bool>,
    /// Explicit center restriction; honored for unrestricted scopes only.
    pub center: Option<String>,
}

impl RosterFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.affiliated.is_none()
            && self.voted.is_none()
            && self.center.is_none()
    }
}

/// Apply scope restriction and secondary filters in sequence.
///
/// A center-bound scope already pins the center, so the explicit center
/// filter is ignored for it.
pub fn scoped_view(roster: &Roster, scope: &Scope, filter: &RosterFilter) -> Roster {
    let scoped = visible_to(roster, scope);
    if filter.is_empty() {
        return scoped;
    }

    // Queries arrive untrimmed from input fields; fold after trimming so
    // `"JOSÉ "` still matches a record trimmed to `"José"`.
    let folded_query = filter.search.as_deref().map(str::trim).map(fold_text);
    let center = match scope {
        Scope::All => filter.center.as_deref(),
        Scope::Center(_) => None,
    };

    scoped
        .iter()
        .filter(|v| {
            folded_query
                .as_deref()
                .map_or(true, |query| matches_search(v, query))
        })
        .filter(|v| {
            filter
                .affiliated
                .map_or(true, |wanted| v.afiliado_ugt == wanted)
        })
        .filter(|v| filter.voted.map_or(true, |wanted| v.ha_votado == wanted))
        .filter(|v| center.map_or(true, |c| v.centro_votacion == c))
        .cloned()
        .collect()
}

/// Diacritic- and case-insensitive substring match over the searchable
/// fields. The query must already be folded.
fn matches_search(voter: &Voter, folded_query: &str) -> bool {
    fold_text(&voter.full_name()).contains(folded_query)
        || fold_text(&voter.email).contains(folded_query)
        || voter.telefono.contains(folded_query)
}
