pub mod args;
pub mod constants;
pub mod database;
pub mod error;
pub mod players;
pub mod ranking;
pub mod store;
pub mod utils;
