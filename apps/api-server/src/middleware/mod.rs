//! Middleware modules.

pub mod auth;
pub mod cors;
pub mod error;
pub mod rate_limit;

pub use auth::{AdminUser, CurrentUser, MaybeUser};
pub use cors::cors;
pub use error::{AppError, AppResult};
pub use rate_limit::RateLimitMiddleware;
