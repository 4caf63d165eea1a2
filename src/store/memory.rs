use super::{RankingStore, StoreError};
use async_trait::async_trait;
use itertools::Itertools;
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard}
};

/// In-process sorted set with Redis ordering semantics.
#[derive(Default)]
pub struct MemoryRankingStore {
    scores: RwLock<HashMap<String, f64>>
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.read().get(member).copied()
    }

    /// Score descending, then member descending: the `ZREVRANGE` order.
    fn ordering(a: &(&String, &f64), b: &(&String, &f64)) -> Ordering {
        b.1.total_cmp(a.1).then_with(|| b.0.cmp(a.0))
    }

    fn sorted(&self) -> Vec<(String, f64)> {
        self.read()
            .iter()
            .sorted_by(Self::ordering)
            .map(|(member, score)| (member.clone(), *score))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, f64>> {
        self.scores.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, f64>> {
        self.scores.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RankingStore for MemoryRankingStore {
    async fn upsert(&self, member: &str, score: f64) -> Result<(), StoreError> {
        self.write().insert(member.to_string(), score);
        Ok(())
    }

    async fn remove(&self, member: &str) -> Result<(), StoreError> {
        self.write().remove(member);
        Ok(())
    }

    async fn range_desc_with_scores(
        &self,
        offset: usize,
        count: Option<usize>
    ) -> Result<Vec<(String, f64)>, StoreError> {
        let entries = self.sorted().into_iter().skip(offset);
        Ok(match count {
            Some(count) => entries.take(count).collect(),
            None => entries.collect()
        })
    }

    async fn rank(&self, member: &str) -> Result<Option<u64>, StoreError> {
        let state = self.read();
        let Some(score) = state.get(member) else {
            return Ok(None);
        };

        let member = member.to_string();
        let target = (&member, score);
        let ahead = state
            .iter()
            .filter(|entry| Self::ordering(entry, &target) == Ordering::Less)
            .count();

        Ok(Some(ahead as u64 + 1))
    }

    async fn len(&self) -> Result<u64, StoreError> {
        Ok(self.read().len() as u64)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write().clear();
        Ok(())
    }
}
