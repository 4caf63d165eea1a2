pub mod service;
pub mod snapshot;
pub mod sync;

use crate::database::db_structs::PlayerId;
use serde::Serialize;

pub use service::{RankingConfig, RankingService};
pub use snapshot::{RankedPlayer, RankingSnapshot, RankingSnapshotEntry};
pub use sync::RankingSync;

/// One player's position in the leaderboard, nickname resolved at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRatingEntry {
    pub player_id: PlayerId,
    pub nickname: String,
    pub rating: i32
}

/// Leaderboard members are stable player ids, never nicknames.
pub fn player_key(id: PlayerId) -> String {
    id.to_string()
}

pub fn parse_player_key(member: &str) -> Option<PlayerId> {
    member.parse().ok()
}

pub(crate) fn score_to_rating(score: f64) -> i32 {
    score.round() as i32
}
