use ddada_ranking::store::{MemoryRankingStore, RankingStore, RedisConfig, RedisRankingStore, StoreError};
use serial_test::serial;
use std::time::Duration;

use super::test_helpers::TestRedis;
use crate::common::init_test_env;

async fn fill(store: &dyn RankingStore) {
    for (member, score) in [("1", 1500.0), ("2", 1800.0), ("3", 1200.0), ("4", 1500.0), ("5", 900.0)] {
        store.upsert(member, score).await.unwrap();
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_redis_store_basic_operations() {
    init_test_env();
    let redis = TestRedis::new();
    let store = redis.store().await;

    assert!(store.is_empty().await.unwrap());
    fill(&store).await;

    assert_eq!(store.len().await.unwrap(), 5);
    assert_eq!(store.rank("2").await.unwrap(), Some(1));
    assert_eq!(store.rank("99").await.unwrap(), None);

    store.upsert("5", 2000.0).await.unwrap();
    assert_eq!(store.rank("5").await.unwrap(), Some(1));
    assert_eq!(store.len().await.unwrap(), 5);

    store.remove("5").await.unwrap();
    store.remove("5").await.unwrap();
    assert_eq!(store.rank("5").await.unwrap(), None);

    store.clear().await.unwrap();
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_memory_store_orders_like_redis() {
    init_test_env();
    let redis = TestRedis::new();
    let redis_store = redis.store().await;
    let memory_store = MemoryRankingStore::new();

    fill(&redis_store).await;
    fill(&memory_store).await;

    assert_eq!(
        redis_store.range_desc_with_scores(0, None).await.unwrap(),
        memory_store.range_desc_with_scores(0, None).await.unwrap()
    );
    assert_eq!(
        redis_store.range_desc_with_scores(1, Some(2)).await.unwrap(),
        memory_store.range_desc_with_scores(1, Some(2)).await.unwrap()
    );

    for member in ["1", "2", "3", "4", "5"] {
        assert_eq!(
            redis_store.rank(member).await.unwrap(),
            memory_store.rank(member).await.unwrap(),
            "rank of {member}"
        );
    }
}

#[tokio::test]
async fn test_unreachable_redis_is_unavailable_after_retries() {
    init_test_env();
    let config = RedisConfig {
        url: "redis://127.0.0.1:1/0".to_string(),
        retry_attempts: 2,
        retry_delay: Duration::from_millis(1),
        max_retry_delay: Duration::from_millis(2),
        ..RedisConfig::default()
    };

    match RedisRankingStore::connect(&config).await {
        Err(StoreError::Unavailable { operation, attempts, .. }) => {
            assert_eq!(operation, "connect");
            assert_eq!(attempts, 2);
        }
        Err(e) => panic!("expected an unavailable store, got {e}"),
        Ok(_) => panic!("expected connecting to a closed port to fail")
    }
}
