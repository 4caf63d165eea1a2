use super::{
    parse_player_key, player_key, score_to_rating,
    snapshot::{RankedPlayer, RankingSnapshot},
    PlayerRatingEntry
};
use crate::{
    constants::default_constants,
    database::{
        db_structs::{OutboxAction, Player, PlayerId},
        PlayerDirectory
    },
    error::{RankingError, RankingResult},
    store::RankingStore
};
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingConfig {
    /// Leaderboard window size; `None` returns every ranked player.
    pub page_size: Option<usize>,
    /// Skip appending the caller's entry when they are already in the window.
    pub dedupe_self_entry: bool
}

impl Default for RankingConfig {
    fn default() -> Self {
        let constants = default_constants();
        RankingConfig {
            page_size: constants.page_size,
            dedupe_self_entry: constants.dedupe_self_entry
        }
    }
}

/// Keeps the ranking store as a cache of live players' ratings and answers
/// ranking queries from it.
///
/// The store is populated lazily: the first read that finds it empty scans
/// the player directory. Rebuilds are single-flight; concurrent readers of a
/// cold store wait for the one scan in progress instead of starting their own.
pub struct RankingService {
    store: Arc<dyn RankingStore>,
    directory: Arc<dyn PlayerDirectory>,
    config: RankingConfig,
    rebuild_guard: Mutex<()>
}

impl RankingService {
    pub fn new(store: Arc<dyn RankingStore>, directory: Arc<dyn PlayerDirectory>, config: RankingConfig) -> Self {
        RankingService {
            store,
            directory,
            config,
            rebuild_guard: Mutex::new(())
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Must follow every rating change and every onboarding.
    pub async fn save_player_to_ranking(&self, player: &Player) -> RankingResult<()> {
        self.save_rating(player.id, player.rating).await
    }

    pub async fn save_rating(&self, id: PlayerId, rating: i32) -> RankingResult<()> {
        self.store.upsert(&player_key(id), f64::from(rating)).await?;
        Ok(())
    }

    /// Must complete before a player deletion is reported done.
    pub async fn remove_player_from_ranking(&self, player: &Player) -> RankingResult<()> {
        self.remove_player(player.id).await
    }

    pub async fn remove_player(&self, id: PlayerId) -> RankingResult<()> {
        self.store.remove(&player_key(id)).await?;
        Ok(())
    }

    /// Applies a committed directory change to the store. Returns whether the
    /// store was written.
    ///
    /// Runs under the rebuild guard, so a rebuild scan taken before the change
    /// cannot overwrite it. A cold store is left cold for the lazy rebuild to
    /// fill from the directory.
    pub async fn apply_change(&self, id: PlayerId, action: OutboxAction) -> RankingResult<bool> {
        let _guard = self.rebuild_guard.lock().await;

        if self.store.is_empty().await? {
            debug!(player_id = id, "Ranking store is cold, leaving change to the next rebuild");
            return Ok(false);
        }

        match action {
            OutboxAction::Upsert { rating } => self.save_rating(id, rating).await?,
            OutboxAction::Remove => self.remove_player(id).await?
        }

        Ok(true)
    }

    /// The configured leaderboard window, best first. Rebuilds an empty store.
    pub async fn get_all_players(&self) -> RankingResult<Vec<PlayerRatingEntry>> {
        Ok(self
            .ranked_window()
            .await?
            .into_iter()
            .map(|p| PlayerRatingEntry {
                player_id: p.player_id,
                nickname: p.nickname,
                rating: p.rating
            })
            .collect())
    }

    /// 1-based rank. Fails with [`RankingError::PlayerNotRanked`] when the
    /// player has no leaderboard entry.
    pub async fn get_player_rank(&self, player: &Player) -> RankingResult<u64> {
        self.store
            .rank(&player_key(player.id))
            .await?
            .ok_or(RankingError::PlayerNotRanked(player.id))
    }

    /// Ranking view for `caller`: the leaderboard window, then the caller's
    /// own entry with their exact rank.
    pub async fn get_ranking_view(&self, caller: Option<PlayerId>) -> RankingResult<RankingSnapshot> {
        let caller_id = caller.ok_or(RankingError::PlayerNotAuthenticated)?;
        let player = self
            .directory
            .find_by_id(caller_id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or(RankingError::PlayerNotFound(caller_id))?;

        let window = self.ranked_window().await?;
        let rank = self.get_player_rank(&player).await?;
        let game_count = self.directory.find_game_count_by_nickname(&player.nickname).await?;

        debug!(player_id = caller_id, rank, window = window.len(), "Assembling ranking view");

        let caller_entry = RankedPlayer {
            rank,
            player_id: player.id,
            nickname: player.nickname,
            rating: player.rating,
            game_count
        };

        Ok(RankingSnapshot::assemble(
            window,
            caller_entry,
            self.config.dedupe_self_entry
        ))
    }

    /// Rebuilds the store if it is empty. Returns whether this call rebuilt it.
    pub async fn ensure_populated(&self) -> RankingResult<bool> {
        if !self.store.is_empty().await? {
            return Ok(false);
        }

        let _guard = self.rebuild_guard.lock().await;

        // Another request may have finished the rebuild while we waited
        if !self.store.is_empty().await? {
            debug!("Ranking store populated by a concurrent rebuild");
            return Ok(false);
        }

        self.populate().await?;
        Ok(true)
    }

    /// Drops the store and repopulates it from the directory.
    /// Returns the number of players ranked.
    pub async fn rebuild(&self) -> RankingResult<usize> {
        let _guard = self.rebuild_guard.lock().await;

        self.store.clear().await?;
        self.populate().await
    }

    /// Callers hold `rebuild_guard`. A failed scan leaves the store empty so
    /// the next read retries the rebuild.
    async fn populate(&self) -> RankingResult<usize> {
        let started = Instant::now();
        info!("Rebuilding ranking store from the player directory");

        match self.load_live_players().await {
            Ok(count) => {
                info!("Ranking rebuild complete: {} players in {:?}", count, started.elapsed());
                Ok(count)
            }
            Err(e) => {
                error!("Ranking rebuild failed: {}", e);
                if let Err(clear_error) = self.store.clear().await {
                    warn!("Could not clear partially rebuilt ranking store: {}", clear_error);
                }

                Err(e)
            }
        }
    }

    async fn load_live_players(&self) -> RankingResult<usize> {
        let players = self.directory.find_all().await?;

        let mut saved = 0;
        for player in players.iter().filter(|p| !p.is_deleted) {
            self.save_player_to_ranking(player).await?;
            saved += 1;
        }

        Ok(saved)
    }

    async fn ranked_window(&self) -> RankingResult<Vec<RankedPlayer>> {
        self.ensure_populated().await?;

        let entries = self.store.range_desc_with_scores(0, self.config.page_size).await?;
        let ids: Vec<PlayerId> = entries.iter().filter_map(|(member, _)| parse_player_key(member)).collect();
        let summaries = self.directory.find_summaries_by_ids(&ids).await?;

        let mut window = Vec::with_capacity(entries.len());
        for (position, (member, score)) in entries.into_iter().enumerate() {
            let Some(summary) = parse_player_key(&member).and_then(|id| summaries.get(&id)) else {
                warn!("Skipping leaderboard member '{}' with no live player", member);
                continue;
            };

            window.push(RankedPlayer {
                rank: position as u64 + 1,
                player_id: summary.id,
                nickname: summary.nickname.clone(),
                rating: score_to_rating(score),
                game_count: summary.game_count
            });
        }

        Ok(window)
    }
}
