mod db_tests;
mod redis_tests;
pub mod test_helpers;
