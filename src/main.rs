use clap::Parser;
use ddada_ranking::{
    args::{Args, Command},
    database::{DbClient, PlayerDirectory, RatingOutbox},
    error::{RankingError, RankingResult},
    players::PlayerService,
    ranking::{RankingConfig, RankingService, RankingSync},
    store::{RankingStore, RedisConfig, RedisRankingStore}
};
use std::{process, sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    let db = match DbClient::connect(&args.connection_string).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            error!("Application cannot start without a valid database connection");
            process::exit(1);
        }
    };

    let redis_config = RedisConfig::from_env();
    let store = match RedisRankingStore::connect(&redis_config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to connect to Redis at {}: {}", redis_config.url, e);
            error!("Application cannot start without a ranking store");
            process::exit(1);
        }
    };

    let config = RankingConfig {
        page_size: args.page_size,
        dedupe_self_entry: args.dedupe_self_entry
    };

    if let Err(e) = run(args.command, db, store, config).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(
    command: Command,
    db: Arc<DbClient>,
    store: Arc<dyn RankingStore>,
    config: RankingConfig
) -> RankingResult<()> {
    let directory: Arc<dyn PlayerDirectory> = db.clone();
    let outbox: Arc<dyn RatingOutbox> = db;

    let ranking = Arc::new(RankingService::new(store, directory.clone(), config));
    let sync = Arc::new(RankingSync::new(outbox.clone(), ranking.clone()));
    let players = PlayerService::new(outbox, sync.clone());

    match command {
        Command::Rebuild => {
            let count = ranking.rebuild().await?;
            info!("Leaderboard rebuilt with {} players", count);
        }
        Command::View { player_id } => {
            let snapshot = ranking.get_ranking_view(Some(player_id)).await?;
            println!("{}", snapshot.to_json_pretty()?);
        }
        Command::Rank { player_id } => {
            ranking.ensure_populated().await?;
            let player = directory
                .find_by_id(player_id)
                .await?
                .filter(|p| !p.is_deleted)
                .ok_or(RankingError::PlayerNotFound(player_id))?;
            let rank = ranking.get_player_rank(&player).await?;
            println!("{} ({}) is ranked #{} with {}", player.nickname, player.id, rank, player.rating);
        }
        Command::Sync { follow, interval_secs } => {
            if follow {
                let shutdown = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                    }
                };
                sync.run(Duration::from_secs(interval_secs.max(1)), shutdown).await;
            } else {
                let count = sync.flush().await?;
                info!("Applied {} queued ranking changes", count);
            }
        }
        Command::SetRating { player_id, rating } => {
            let player = players.change_rating(player_id, rating).await?;
            info!("{} ({}) now has rating {}", player.nickname, player.id, player.rating);
        }
        Command::Delete { player_id } => {
            let player = players.delete_player(player_id).await?;
            info!("{} ({}) deleted and removed from the leaderboard", player.nickname, player.id);
        }
    }

    Ok(())
}
