pub mod retry;
pub mod test_utils;
