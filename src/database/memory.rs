use super::{
    db_structs::{OutboxAction, OutboxEntry, Player, PlayerId, PlayerSummary},
    DirectoryError, PlayerDirectory, RatingOutbox
};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard}
};

#[derive(Default)]
struct DirectoryState {
    players: IndexMap<PlayerId, Player>,
    outbox: Vec<OutboxEntry>,
    next_outbox_id: i64
}

impl DirectoryState {
    fn queue(&mut self, player_id: PlayerId, action: OutboxAction) {
        self.next_outbox_id += 1;
        self.outbox.push(OutboxEntry {
            id: self.next_outbox_id,
            player_id,
            action,
            created_at: Utc::now()
        });
    }
}

/// In-process directory with the same contract as [`super::DbClient`].
/// Players are returned in insertion order.
#[derive(Default)]
pub struct MemoryPlayerDirectory {
    state: RwLock<DirectoryState>
}

impl MemoryPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let directory = Self::new();
        for player in players {
            directory.insert(player);
        }

        directory
    }

    /// Inserts or overwrites a player without touching the outbox, the way a
    /// write that bypasses the ranking would.
    pub fn insert(&self, player: Player) {
        self.write().players.insert(player.id, player);
    }

    pub fn outbox_len(&self) -> usize {
        self.read().outbox.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PlayerDirectory for MemoryPlayerDirectory {
    async fn find_all(&self) -> Result<Vec<Player>, DirectoryError> {
        Ok(self.read().players.values().cloned().collect())
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError> {
        Ok(self.read().players.get(&id).cloned())
    }

    async fn find_game_count_by_nickname(&self, nickname: &str) -> Result<i32, DirectoryError> {
        Ok(self
            .read()
            .players
            .values()
            .find(|p| !p.is_deleted && p.nickname == nickname)
            .map_or(0, |p| p.game_count))
    }

    async fn find_summaries_by_ids(
        &self,
        ids: &[PlayerId]
    ) -> Result<HashMap<PlayerId, PlayerSummary>, DirectoryError> {
        let state = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.players.get(id))
            .filter(|p| !p.is_deleted)
            .map(|p| (p.id, PlayerSummary::from(p)))
            .collect())
    }
}

#[async_trait]
impl RatingOutbox for MemoryPlayerDirectory {
    async fn update_rating(&self, id: PlayerId, rating: i32) -> Result<Option<Player>, DirectoryError> {
        let mut state = self.write();
        let updated = match state.players.get_mut(&id) {
            Some(player) if !player.is_deleted => {
                player.rating = rating;
                player.clone()
            }
            _ => return Ok(None)
        };

        state.queue(id, OutboxAction::Upsert { rating });
        Ok(Some(updated))
    }

    async fn mark_deleted(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError> {
        let mut state = self.write();
        let deleted = match state.players.get_mut(&id) {
            Some(player) if !player.is_deleted => {
                player.is_deleted = true;
                player.clone()
            }
            _ => return Ok(None)
        };

        state.queue(id, OutboxAction::Remove);
        Ok(Some(deleted))
    }

    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, DirectoryError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.read().outbox.iter().take(limit).cloned().collect())
    }

    async fn acknowledge(&self, ids: &[i64]) -> Result<(), DirectoryError> {
        self.write().outbox.retain(|entry| !ids.contains(&entry.id));
        Ok(())
    }
}
