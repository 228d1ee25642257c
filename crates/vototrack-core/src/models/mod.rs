//! Data models for VotoTrack

mod operator;
mod roster;
mod voter;

pub use operator::{Role, Scope};
pub use roster::{Roster, Turnout};
pub use voter::{normalize_bool, RawRow, Voter, VoterId};
