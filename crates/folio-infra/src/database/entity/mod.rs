//! SeaORM entities. JSON-shaped fields are stored as JSONB.

pub mod post;
pub mod profile;
pub mod user;
