//! Ranking Store: a sorted `member -> score` set backing the leaderboard.
//!
//! Members are ordered by score descending. Equal scores are ordered by
//! member, descending lexicographically, which is what Redis `ZREVRANGE`
//! and `ZREVRANK` do. [`MemoryRankingStore`] reproduces that order so both
//! adapters rank identically.

pub mod config;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

pub use config::RedisConfig;
pub use memory::MemoryRankingStore;
pub use redis_store::RedisRankingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ranking store command failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("ranking store unavailable: {operation} failed after {attempts} attempts: {source}")]
    Unavailable {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: redis::RedisError
    }
}

impl StoreError {
    /// Connection-level failures worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Redis(e) => is_connection_error(e),
            StoreError::Unavailable { .. } => false
        }
    }
}

/// I/O, timeout, dropped or refused connection.
pub(crate) fn is_connection_error(e: &redis::RedisError) -> bool {
    e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
}

#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Inserts `member` or replaces its score.
    async fn upsert(&self, member: &str, score: f64) -> Result<(), StoreError>;

    /// No-op when `member` is absent.
    async fn remove(&self, member: &str) -> Result<(), StoreError>;

    /// Up to `count` entries starting at `offset`, highest score first.
    /// `None` reads to the end of the set.
    async fn range_desc_with_scores(
        &self,
        offset: usize,
        count: Option<usize>
    ) -> Result<Vec<(String, f64)>, StoreError>;

    /// 1-based position by descending score.
    async fn rank(&self, member: &str) -> Result<Option<u64>, StoreError>;

    async fn len(&self) -> Result<u64, StoreError>;

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Drops every entry.
    async fn clear(&self) -> Result<(), StoreError>;
}
