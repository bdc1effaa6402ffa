pub mod db_utils;
pub mod geo;
pub mod time;
pub mod username_cache;
