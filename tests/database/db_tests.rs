use ddada_ranking::database::{db_structs::OutboxAction, DbClient, PlayerDirectory, RatingOutbox};
use serial_test::serial;

use super::test_helpers::TestDatabase;
use crate::common::init_test_env;

async fn seeded() -> (TestDatabase, DbClient) {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db.seed_test_data().await.expect("Failed to seed test data");

    let db_client = DbClient::connect(&test_db.connection_string)
        .await
        .expect("Failed to connect");

    (test_db, db_client)
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_find_all_includes_deleted_players() {
    let (_test_db, db_client) = seeded().await;

    let players = db_client.find_all().await.unwrap();

    assert_eq!(players.len(), 4);
    assert_eq!(players[0].nickname, "alice");
    assert!(players[3].is_deleted);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_find_game_count_by_nickname() {
    let (_test_db, db_client) = seeded().await;

    assert_eq!(db_client.find_game_count_by_nickname("bob").await.unwrap(), 9);
    assert_eq!(db_client.find_game_count_by_nickname("dave").await.unwrap(), 0);
    assert_eq!(db_client.find_game_count_by_nickname("nobody").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_find_summaries_by_ids_skips_deleted() {
    let (_test_db, db_client) = seeded().await;

    let summaries = db_client.find_summaries_by_ids(&[1, 3, 4, 99]).await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[&1].nickname, "alice");
    assert_eq!(summaries[&3].game_count, 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_update_rating_queues_outbox_row() {
    let (test_db, db_client) = seeded().await;

    let alice = db_client.update_rating(1, 1650).await.unwrap().unwrap();
    assert_eq!(alice.rating, 1650);

    let pending = db_client.pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].player_id, 1);
    assert_eq!(pending[0].action, OutboxAction::Upsert { rating: 1650 });

    // Deleted players are not written and queue nothing
    assert!(db_client.update_rating(4, 100).await.unwrap().is_none());
    assert_eq!(test_db.outbox_len().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_mark_deleted_queues_removal_once() {
    let (test_db, db_client) = seeded().await;

    let bob = db_client.mark_deleted(2).await.unwrap().unwrap();
    assert!(bob.is_deleted);
    assert!(db_client.mark_deleted(2).await.unwrap().is_none());

    let pending = db_client.pending(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].action, OutboxAction::Remove);
    assert_eq!(test_db.outbox_len().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_acknowledge_deletes_rows() {
    let (test_db, db_client) = seeded().await;
    db_client.update_rating(1, 1600).await.unwrap();
    db_client.update_rating(2, 1700).await.unwrap();
    db_client.update_rating(3, 1800).await.unwrap();

    let pending = db_client.pending(2).await.unwrap();
    assert_eq!(pending.iter().map(|e| e.player_id).collect::<Vec<_>>(), vec![1, 2]);

    let ids: Vec<i64> = pending.iter().map(|e| e.id).collect();
    db_client.acknowledge(&ids).await.unwrap();

    assert_eq!(test_db.outbox_len().await.unwrap(), 1);
    assert_eq!(db_client.pending(10).await.unwrap()[0].player_id, 3);
}
