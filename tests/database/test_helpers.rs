use ddada_ranking::store::{RedisConfig, RedisRankingStore};
use lazy_static::lazy_static;
use std::{sync::Arc, time::Duration};
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::{postgres::Postgres, redis::Redis};
use tokio_postgres::{Client, NoTls};

lazy_static! {
    static ref DOCKER: Arc<Cli> = Arc::new(Cli::default());
}

pub struct TestDatabase {
    pub connection_string: String,
    _container: Container<'static, Postgres>
}

impl TestDatabase {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        let connection_string = format!(
            "host=localhost port={} user=postgres password=postgres dbname=postgres",
            port
        );

        let test_db = TestDatabase {
            connection_string,
            _container: container
        };

        let client = test_db.get_client().await?;
        client.batch_execute(include_str!("schema.sql")).await?;

        Ok(test_db)
    }

    pub async fn get_client(&self) -> Result<Client, Box<dyn std::error::Error>> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("Database connection error: {}", e);
            }
        });

        Ok(client)
    }

    /// alice (1500, 4 games), bob (1800, 9 games), carol (1200, 2 games)
    /// and dave, who is deleted.
    pub async fn seed_test_data(&self) -> Result<(), Box<dyn std::error::Error>> {
        let client = self.get_client().await?;

        client
            .execute(
                "INSERT INTO players (id, nickname, rating, is_deleted, game_count)
             VALUES
             (1, 'alice', 1500, FALSE, 4),
             (2, 'bob', 1800, FALSE, 9),
             (3, 'carol', 1200, FALSE, 2),
             (4, 'dave', 2500, TRUE, 30)",
                &[]
            )
            .await?;

        Ok(())
    }

    pub async fn outbox_len(&self) -> Result<i64, Box<dyn std::error::Error>> {
        let client = self.get_client().await?;
        let row = client.query_one("SELECT COUNT(*) FROM ranking_outbox", &[]).await?;

        Ok(row.get(0))
    }
}

pub struct TestRedis {
    pub config: RedisConfig,
    _container: Container<'static, Redis>
}

impl TestRedis {
    pub fn new() -> Self {
        let container = DOCKER.run(Redis::default());
        let port = container.get_host_port_ipv4(6379);

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}/0", port),
            ranking_key: "ranking:test".to_string(),
            retry_attempts: 5,
            retry_delay: Duration::from_millis(50),
            max_retry_delay: Duration::from_millis(500)
        };

        TestRedis {
            config,
            _container: container
        }
    }

    pub async fn store(&self) -> RedisRankingStore {
        RedisRankingStore::connect(&self.config)
            .await
            .expect("Failed to connect to test Redis")
    }
}
