use std::time::Duration;

/// Redis key holding the player leaderboard sorted set.
pub const DEFAULT_RANKING_KEY: &str = "ranking";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outbox rows applied per flush.
pub const OUTBOX_BATCH_SIZE: i64 = 500;
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5);

pub struct RankingConstants {
    /// `None` returns the whole leaderboard.
    pub page_size: Option<usize>,
    pub dedupe_self_entry: bool
}

pub fn default_constants() -> RankingConstants {
    RankingConstants {
        page_size: None,
        dedupe_self_entry: false
    }
}
