use ddada_ranking::{
    database::{DbClient, PlayerDirectory, RatingOutbox},
    error::RankingError,
    players::PlayerService,
    ranking::{RankingConfig, RankingService, RankingSync}
};
use serial_test::serial;
use std::sync::Arc;

use crate::{
    common::init_test_env,
    database::test_helpers::{TestDatabase, TestRedis}
};

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_postgres_and_redis_flow() {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db.seed_test_data().await.expect("Failed to seed test data");
    let redis = TestRedis::new();

    let db = Arc::new(
        DbClient::connect(&test_db.connection_string)
            .await
            .expect("Failed to connect")
    );
    let directory: Arc<dyn PlayerDirectory> = db.clone();
    let outbox: Arc<dyn RatingOutbox> = db;

    let ranking = Arc::new(RankingService::new(
        Arc::new(redis.store().await),
        directory,
        RankingConfig::default()
    ));
    let sync = Arc::new(RankingSync::new(outbox.clone(), ranking.clone()));
    let players = PlayerService::new(outbox, sync);

    // Cold store: the first read rebuilds from live players only
    let view = ranking.get_ranking_view(Some(1)).await.unwrap();
    let nicknames: Vec<&str> = view.entries.iter().map(|e| e.nickname.as_str()).collect();
    assert_eq!(nicknames, vec!["bob", "alice", "carol", "alice"]);
    assert_eq!(view.entries[3].rank, 2);
    assert_eq!(view.entries[3].game_count, 4);

    let carol = players.change_rating(3, 1900).await.unwrap();
    assert_eq!(ranking.get_player_rank(&carol).await.unwrap(), 1);

    let bob = players.delete_player(2).await.unwrap();
    assert!(matches!(
        ranking.get_player_rank(&bob).await,
        Err(RankingError::PlayerNotRanked(2))
    ));
    assert_eq!(test_db.outbox_len().await.unwrap(), 0);

    assert_eq!(ranking.rebuild().await.unwrap(), 2);
    let all = ranking.get_all_players().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].nickname, "carol");
    assert_eq!(all[0].rating, 1900);
}
