//! Storage infrastructure - backend implementations of the storage traits

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStorage;
pub use postgres::{PostgresConfig, PostgresStorage, connect_pool};
