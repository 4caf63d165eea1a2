use super::{
    db_structs::{OutboxAction, OutboxEntry, Player, PlayerId, PlayerSummary},
    DirectoryError, PlayerDirectory, RatingOutbox
};
use async_trait::async_trait;
use postgres_types::ToSql;
use std::{collections::HashMap, sync::Arc};
use tokio_postgres::{Client, Error, NoTls, Row};
use tracing::{debug, error, info};

const PLAYER_COLUMNS: &str = "id, nickname, rating, is_deleted, game_count";

#[derive(Clone)]
pub struct DbClient {
    client: Arc<Client>
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, Error> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });

        Ok(DbClient {
            client: Arc::new(client)
        })
    }

    fn player_from_row(row: &Row) -> Player {
        Player {
            id: row.get("id"),
            nickname: row.get("nickname"),
            rating: row.get("rating"),
            is_deleted: row.get("is_deleted"),
            game_count: row.get("game_count")
        }
    }

    fn outbox_from_row(row: &Row) -> Result<OutboxEntry, DirectoryError> {
        let id: i64 = row.get("id");
        let action: i16 = row.get("action");
        let rating: Option<i32> = row.get("rating");

        let action =
            OutboxAction::from_row(action, rating).ok_or(DirectoryError::InvalidOutboxRow { id, action })?;

        Ok(OutboxEntry {
            id,
            player_id: row.get("player_id"),
            action,
            created_at: row.get("created_at")
        })
    }

    /// Runs a single `UPDATE ... RETURNING` that also queues an outbox row.
    /// Both writes live in one statement, so they commit or fail together.
    async fn write_with_outbox(
        &self,
        query: &str,
        values: &[&(dyn ToSql + Sync)]
    ) -> Result<Option<Player>, DirectoryError> {
        let row = self.client.query_opt(query, values).await?;
        Ok(row.as_ref().map(Self::player_from_row))
    }

    // Access the underlying Client
    pub fn client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }
}

#[async_trait]
impl PlayerDirectory for DbClient {
    async fn find_all(&self) -> Result<Vec<Player>, DirectoryError> {
        info!("Fetching players...");
        let rows = self
            .client
            .query(format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id").as_str(), &[])
            .await?;

        let players: Vec<Player> = rows.iter().map(Self::player_from_row).collect();
        info!("Fetched {} players", players.len());

        Ok(players)
    }

    async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError> {
        let row = self
            .client
            .query_opt(
                format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1").as_str(),
                &[&id]
            )
            .await?;

        Ok(row.as_ref().map(Self::player_from_row))
    }

    async fn find_game_count_by_nickname(&self, nickname: &str) -> Result<i32, DirectoryError> {
        let row = self
            .client
            .query_opt(
                "SELECT game_count FROM players WHERE nickname = $1 AND is_deleted = FALSE",
                &[&nickname]
            )
            .await?;

        Ok(row.map(|row| row.get::<_, i32>("game_count")).unwrap_or(0))
    }

    async fn find_summaries_by_ids(
        &self,
        ids: &[PlayerId]
    ) -> Result<HashMap<PlayerId, PlayerSummary>, DirectoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .client
            .query(
                "SELECT id, nickname, game_count FROM players WHERE id = ANY($1) AND is_deleted = FALSE",
                &[&ids]
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let summary = PlayerSummary {
                    id: row.get("id"),
                    nickname: row.get("nickname"),
                    game_count: row.get("game_count")
                };
                (summary.id, summary)
            })
            .collect())
    }
}

#[async_trait]
impl RatingOutbox for DbClient {
    async fn update_rating(&self, id: PlayerId, rating: i32) -> Result<Option<Player>, DirectoryError> {
        let query = format!(
            "WITH updated AS (
                UPDATE players SET rating = $2 WHERE id = $1 AND is_deleted = FALSE
                RETURNING {PLAYER_COLUMNS}
            ), queued AS (
                INSERT INTO ranking_outbox (player_id, action, rating)
                SELECT id, $3::SMALLINT, rating FROM updated
            )
            SELECT {PLAYER_COLUMNS} FROM updated"
        );

        let player = self
            .write_with_outbox(&query, &[&id, &rating, &OutboxAction::UPSERT])
            .await?;

        debug!(player_id = id, rating, updated = player.is_some(), "Rating update queued");
        Ok(player)
    }

    async fn mark_deleted(&self, id: PlayerId) -> Result<Option<Player>, DirectoryError> {
        let query = format!(
            "WITH updated AS (
                UPDATE players SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE
                RETURNING {PLAYER_COLUMNS}
            ), queued AS (
                INSERT INTO ranking_outbox (player_id, action, rating)
                SELECT id, $2::SMALLINT, NULL::INTEGER FROM updated
            )
            SELECT {PLAYER_COLUMNS} FROM updated"
        );

        let player = self.write_with_outbox(&query, &[&id, &OutboxAction::REMOVE]).await?;

        debug!(player_id = id, deleted = player.is_some(), "Player deletion queued");
        Ok(player)
    }

    async fn pending(&self, limit: i64) -> Result<Vec<OutboxEntry>, DirectoryError> {
        let rows = self
            .client
            .query(
                "SELECT id, player_id, action, rating, created_at FROM ranking_outbox ORDER BY id LIMIT $1",
                &[&limit]
            )
            .await?;

        rows.iter().map(Self::outbox_from_row).collect()
    }

    async fn acknowledge(&self, ids: &[i64]) -> Result<(), DirectoryError> {
        if ids.is_empty() {
            return Ok(());
        }

        let deleted = self
            .client
            .execute("DELETE FROM ranking_outbox WHERE id = ANY($1)", &[&ids])
            .await?;

        debug!("Acknowledged {} outbox rows", deleted);
        Ok(())
    }
}
