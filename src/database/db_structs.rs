use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PlayerId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub rating: i32,
    pub is_deleted: bool,
    pub game_count: i32
}

impl Player {
    pub fn new(id: PlayerId, nickname: &str, rating: i32) -> Self {
        Player {
            id,
            nickname: nickname.to_string(),
            rating,
            is_deleted: false,
            game_count: 0
        }
    }
}

/// Display data resolved at read time for a leaderboard member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub nickname: String,
    pub game_count: i32
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        PlayerSummary {
            id: player.id,
            nickname: player.nickname.clone(),
            game_count: player.game_count
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxAction {
    Upsert { rating: i32 },
    Remove
}

impl OutboxAction {
    // Stored in `ranking_outbox.action`
    pub const UPSERT: i16 = 0;
    pub const REMOVE: i16 = 1;

    pub fn from_row(action: i16, rating: Option<i32>) -> Option<Self> {
        match (action, rating) {
            (Self::UPSERT, Some(rating)) => Some(OutboxAction::Upsert { rating }),
            (Self::REMOVE, _) => Some(OutboxAction::Remove),
            _ => None
        }
    }
}

/// A ranking change committed alongside a player write, waiting to be applied
/// to the ranking store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboxEntry {
    pub id: i64,
    pub player_id: PlayerId,
    pub action: OutboxAction,
    pub created_at: DateTime<Utc>
}
