use crate::database::db_structs::{Player, PlayerId};

pub fn player(id: PlayerId, nickname: &str, rating: i32) -> Player {
    Player::new(id, nickname, rating)
}

pub fn deleted_player(id: PlayerId, nickname: &str, rating: i32) -> Player {
    Player {
        is_deleted: true,
        ..Player::new(id, nickname, rating)
    }
}

/// `n` live players with ids `1..=n`, distinct nicknames and a spread of
/// ratings and game counts.
pub fn generate_players(n: i64) -> Vec<Player> {
    (1..=n)
        .map(|id| Player {
            game_count: (id % 7) as i32,
            ..Player::new(id, &format!("player{id}"), 1000 + ((id * 37) % 500) as i32)
        })
        .collect()
}
