use super::RankingService;
use crate::{
    constants::OUTBOX_BATCH_SIZE,
    database::{
        db_structs::OutboxEntry,
        RatingOutbox
    },
    error::RankingResult
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Applies queued rating changes and deletions to the ranking store.
///
/// Entries are applied oldest first and acknowledged only once applied, so a
/// store outage leaves the rest queued for the next flush. Entries that reach
/// a cold store are acknowledged without a write; the next rebuild reads them
/// from the directory. Flushes within one process are serialized to keep
/// per-player ordering.
pub struct RankingSync {
    outbox: Arc<dyn RatingOutbox>,
    ranking: Arc<RankingService>,
    batch_size: i64,
    flush_guard: Mutex<()>
}

impl RankingSync {
    pub fn new(outbox: Arc<dyn RatingOutbox>, ranking: Arc<RankingService>) -> Self {
        Self::with_batch_size(outbox, ranking, OUTBOX_BATCH_SIZE)
    }

    pub fn with_batch_size(outbox: Arc<dyn RatingOutbox>, ranking: Arc<RankingService>, batch_size: i64) -> Self {
        RankingSync {
            outbox,
            ranking,
            batch_size: batch_size.max(1),
            flush_guard: Mutex::new(())
        }
    }

    /// Drains the outbox. Returns the number of entries acknowledged.
    pub async fn flush(&self) -> RankingResult<usize> {
        let _guard = self.flush_guard.lock().await;
        let mut total = 0;

        loop {
            let pending = self.outbox.pending(self.batch_size).await?;
            let batch_len = pending.len();

            let mut applied = Vec::with_capacity(batch_len);
            let mut failure = None;
            for entry in &pending {
                if let Err(e) = self.apply(entry).await {
                    failure = Some(e);
                    break;
                }
                applied.push(entry.id);
            }

            self.outbox.acknowledge(&applied).await?;
            total += applied.len();

            if let Some(e) = failure {
                warn!("Outbox flush stopped after {} entries: {}", total, e);
                return Err(e);
            }

            if (batch_len as i64) < self.batch_size {
                break;
            }
        }

        if total > 0 {
            debug!("Applied {} outbox entries", total);
        }

        Ok(total)
    }

    /// Flushes every `interval` until `shutdown` resolves.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(interval);

        info!("Ranking sync started, flushing every {:?}", interval);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Ranking sync stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.flush().await {
                        Ok(0) => {}
                        Ok(count) => info!("Synced {} ranking changes", count),
                        Err(e) => error!("Ranking sync failed: {}", e)
                    }
                }
            }
        }
    }

    async fn apply(&self, entry: &OutboxEntry) -> RankingResult<()> {
        self.ranking.apply_change(entry.player_id, entry.action).await?;
        Ok(())
    }
}
