//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`:
//! storage, authentication and rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory storage only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `rate-limit` - Per-client rate limiting via governor

pub mod auth;
pub mod database;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository, connect,
};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
