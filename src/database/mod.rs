//! Player Directory: the system of record for players.
//!
//! The ranking core reads players through [`PlayerDirectory`] and writes
//! rating changes and deletions through [`RatingOutbox`], which queues the
//! matching leaderboard update in the same statement as the player write.

pub mod db;
pub mod db_structs;
pub mod memory;

use async_trait::async_trait;
use db_structs::{OutboxEntry, Player, PlayerId, PlayerSummary};
use std::collections::HashMap;
use thiserror::Error;

pub use db::DbClient;
pub use memory::MemoryPlayerDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("player directory query failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("unreadable outbox row {id}: action {action}")]
    InvalidOutboxRow { id: i64, action: i16 }
}

#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Every player, deleted ones included.
    async fn find_all(&self) -> Result<Vec<Player>, DirectoryError>;

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError>;

    /// Game count of the live player with this nickname, 0 when there is none.
    async fn find_game_count_by_nickname(&self, nickname: &str) -> Result<i32, DirectoryError>;

    /// Display data for the live players among `ids`. Unknown and deleted ids
    /// are absent from the map.
    async fn find_summaries_by_ids(
        &self,
        ids: &[PlayerId]
    ) -> Result<HashMap<PlayerId, PlayerSummary>, DirectoryError>;
}

#[async_trait]
pub trait RatingOutbox: Send + Sync {
    /// Sets a live player's rating and queues the leaderboard upsert.
    /// Returns `None` when the player does not exist or is deleted.
    async fn update_rating(&self, id: PlayerId, rating: i32) -> Result<Option<Player>, DirectoryError>;

    /// Flags a live player as deleted and queues the leaderboard removal.
    /// Returns `None` when the player does not exist or is already deleted.
    async fn mark_deleted(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError>;

    /// Oldest unapplied entries first.
    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, DirectoryError>;

    async fn acknowledge(&self, ids: &[i64]) -> Result<(), DirectoryError>;
}
