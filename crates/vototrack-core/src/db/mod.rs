//! Local cache layer for VotoTrack

mod cache;
mod connection;
mod migrations;

pub use cache::{SqliteSyncStateRepository, SyncStateRepository};
pub use connection::Database;
