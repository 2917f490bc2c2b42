pub mod connection;
pub mod favorites;
pub mod models;
pub mod players;
pub mod scouts;
pub mod setup;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;
