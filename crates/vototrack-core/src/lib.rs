//! vototrack-core - Core library for VotoTrack
//!
//! Roster model, spreadsheet snapshot fetching, reconciliation against the
//! local cache, and optimistic status dispatch, shared by all front ends.

pub mod auth;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod models;
pub mod notify;
pub mod service;
pub mod sheet;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Roster, Voter, VoterId};
pub use service::CensusService;
