//! Persistence: PostgreSQL via SeaORM, plus in-memory stores.

mod connections;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

pub use memory::{InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository};

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository,
};
