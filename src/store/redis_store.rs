use super::{is_connection_error, RankingStore, RedisConfig, StoreError};
use crate::utils::retry::{retry, RetryError, RetryPolicy};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisError, RedisResult};
use std::future::Future;
use tracing::info;

/// Inclusive `ZREVRANGE` bounds, or `None` when the window is empty.
/// Windows running past `isize::MAX` read to the end of the set.
fn range_bounds(offset: usize, count: Option<usize>) -> Option<(isize, isize)> {
    let start = isize::try_from(offset).ok()?;
    let stop = match count {
        Some(0) => return None,
        Some(count) => isize::try_from(offset.saturating_add(count) - 1).unwrap_or(-1),
        None => -1
    };

    Some((start, stop))
}

fn store_error(operation: &'static str, e: RetryError<RedisError>) -> StoreError {
    match e {
        RetryError::Exhausted { attempts, last } => StoreError::Unavailable {
            operation,
            attempts,
            source: last
        },
        RetryError::Fatal(e) => StoreError::Redis(e)
    }
}

/// Leaderboard kept in a Redis sorted set.
#[derive(Clone)]
pub struct RedisRankingStore {
    connection: ConnectionManager,
    key: String,
    retry: RetryPolicy
}

impl RedisRankingStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())?;
        let policy = config.retry_policy();

        // Reconnects are left to `policy`, not to the manager's own backoff
        let connection = retry(&policy, "redis connect", is_connection_error, || {
            client.get_connection_manager_with_backoff(2, 100, 0)
        })
        .await
        .map_err(|e| store_error("connect", e))?;

        info!("Connected to Redis, leaderboard key '{}'", config.ranking_key);

        Ok(RedisRankingStore {
            connection,
            key: config.ranking_key.clone(),
            retry: policy
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Runs one command with a fresh handle on the shared connection,
    /// retrying connection-level failures.
    async fn run<T, F, Fut>(&self, operation: &'static str, mut command: F) -> Result<T, StoreError>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>
    {
        retry(&self.retry, operation, is_connection_error, || command(self.connection.clone()))
            .await
            .map_err(|e| store_error(operation, e))
    }
}

#[async_trait]
impl RankingStore for RedisRankingStore {
    async fn upsert(&self, member: &str, score: f64) -> Result<(), StoreError> {
        let key = self.key.as_str();
        self.run("ZADD", move |mut conn| async move {
            conn.zadd::<_, _, _, ()>(key, member, score).await
        })
        .await
    }

    async fn remove(&self, member: &str) -> Result<(), StoreError> {
        let key = self.key.as_str();
        self.run("ZREM", move |mut conn| async move {
            conn.zrem::<_, _, ()>(key, member).await
        })
        .await
    }

    async fn range_desc_with_scores(
        &self,
        offset: usize,
        count: Option<usize>
    ) -> Result<Vec<(String, f64)>, StoreError> {
        let Some((start, stop)) = range_bounds(offset, count) else {
            return Ok(Vec::new());
        };
        let key = self.key.as_str();

        self.run("ZREVRANGE", move |mut conn| async move {
            conn.zrevrange_withscores::<_, Vec<(String, f64)>>(key, start, stop)
                .await
        })
        .await
    }

    async fn rank(&self, member: &str) -> Result<Option<u64>, StoreError> {
        let key = self.key.as_str();
        let rank = self
            .run("ZREVRANK", move |mut conn| async move {
                conn.zrevrank::<_, _, Option<u64>>(key, member).await
            })
            .await?;

        // ZREVRANK is 0-based
        Ok(rank.map(|r| r + 1))
    }

    async fn len(&self) -> Result<u64, StoreError> {
        let key = self.key.as_str();
        self.run("ZCARD", move |mut conn| async move { conn.zcard::<_, u64>(key).await })
            .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let key = self.key.as_str();
        self.run("DEL", move |mut conn| async move { conn.del::<_, ()>(key).await })
            .await
    }
}
