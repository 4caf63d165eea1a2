use crate::{
    database::{
        db_structs::{Player, PlayerId},
        RatingOutbox
    },
    error::{RankingError, RankingResult},
    ranking::RankingSync
};
use std::sync::Arc;
use tracing::info;

/// Player writes that affect the leaderboard.
///
/// Each write commits the player row together with an outbox entry, then
/// flushes the outbox so the leaderboard reflects the change before the call
/// returns. If the flush fails the write stays committed and the entry stays
/// queued for the next flush; the error is still reported to the caller.
pub struct PlayerService {
    outbox: Arc<dyn RatingOutbox>,
    sync: Arc<RankingSync>
}

impl PlayerService {
    pub fn new(outbox: Arc<dyn RatingOutbox>, sync: Arc<RankingSync>) -> Self {
        PlayerService { outbox, sync }
    }

    pub async fn change_rating(&self, id: PlayerId, rating: i32) -> RankingResult<Player> {
        let player = self
            .outbox
            .update_rating(id, rating)
            .await?
            .ok_or(RankingError::PlayerNotFound(id))?;

        info!("Player {} rating set to {}", id, rating);
        self.sync.flush().await?;

        Ok(player)
    }

    /// Soft-deletes the player. Completes only once the leaderboard entry is gone.
    pub async fn delete_player(&self, id: PlayerId) -> RankingResult<Player> {
        let player = self
            .outbox
            .mark_deleted(id)
            .await?
            .ok_or(RankingError::PlayerNotFound(id))?;

        info!("Player {} deleted", id);
        self.sync.flush().await?;

        Ok(player)
    }
}
