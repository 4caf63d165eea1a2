use crate::{database::db_structs::PlayerId, error::RankingResult};
use serde::Serialize;

/// A resolved leaderboard row, before presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    pub rank: u64,
    pub player_id: PlayerId,
    pub nickname: String,
    pub rating: i32,
    pub game_count: i32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshotEntry {
    pub rank: u64,
    pub nickname: String,
    pub rating: i32,
    pub game_count: i32
}

impl From<RankedPlayer> for RankingSnapshotEntry {
    fn from(player: RankedPlayer) -> Self {
        RankingSnapshotEntry {
            rank: player.rank,
            nickname: player.nickname,
            rating: player.rating,
            game_count: player.game_count
        }
    }
}

/// Ranking view returned to the caller: the leaderboard window followed by
/// the caller's own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingSnapshot {
    #[serde(rename = "rankings")]
    pub entries: Vec<RankingSnapshotEntry>
}

impl RankingSnapshot {
    /// Builds the view. The caller is appended even when already in
    /// `window`, unless `dedupe_self_entry` is set.
    pub fn assemble(window: Vec<RankedPlayer>, caller: RankedPlayer, dedupe_self_entry: bool) -> Self {
        let caller_listed = window.iter().any(|p| p.player_id == caller.player_id);

        let mut entries: Vec<RankingSnapshotEntry> = window.into_iter().map(Into::into).collect();
        if !(dedupe_self_entry && caller_listed) {
            entries.push(caller.into());
        }

        RankingSnapshot { entries }
    }

    pub fn to_json_pretty(&self) -> RankingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
