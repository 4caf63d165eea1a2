use crate::{
    constants::{
        DEFAULT_MAX_RETRY_DELAY, DEFAULT_RANKING_KEY, DEFAULT_REDIS_URL, DEFAULT_RETRY_ATTEMPTS,
        DEFAULT_RETRY_DELAY
    },
    utils::retry::RetryPolicy
};
use std::{env, time::Duration};

/// Configuration for the Redis-backed ranking store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Redis connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
    /// Sorted set holding the leaderboard
    pub ranking_key: String,
    /// Attempts per command before the store is reported unavailable
    pub retry_attempts: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_delay: Duration,
    /// Upper bound for the retry delay
    pub max_retry_delay: Duration
}

impl RedisConfig {
    /// Creates a configuration from environment variables, falling back to
    /// the defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            url: env::var("REDIS_URL").unwrap_or(defaults.url),
            ranking_key: env::var("RANKING_KEY").unwrap_or(defaults.ranking_key),
            retry_attempts: env::var("REDIS_RETRY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_attempts),
            retry_delay: env::var("REDIS_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            max_retry_delay: env::var("REDIS_MAX_RETRY_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_retry_delay)
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_delay, self.max_retry_delay)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            ranking_key: DEFAULT_RANKING_KEY.to_string(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY
        }
    }
}
