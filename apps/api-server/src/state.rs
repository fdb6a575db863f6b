//! Application state - shared across all handlers.

use std::collections::HashSet;
use std::sync::Arc;

use folio_core::ports::{
    PasswordService, PostRepository, ProfileRepository, TokenService, UserRepository,
};
use folio_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use folio_infra::database::{
    InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub profile: Arc<dyn ProfileRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Normalized emails granted the admin role at registration.
    pub admin_emails: Arc<HashSet<String>>,
    /// Which storage adapter is active, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state, connecting to PostgreSQL when configured.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg_attr(not(feature = "postgres"), allow(unused_mut))]
        let mut state = Self::in_memory(config.jwt.clone(), config.admin_emails.clone());

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            use anyhow::Context;
            use folio_infra::database::{
                PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository,
                connect,
            };

            let conn = connect(db_config)
                .await
                .context("failed to connect to DATABASE_URL")?;

            state.users = Arc::new(PostgresUserRepository::new(conn.clone()));
            state.posts = Arc::new(PostgresPostRepository::new(conn.clone()));
            state.profile = Arc::new(PostgresProfileRepository::new(conn));
            state.storage = "postgres";
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
        }

        if state.storage == "memory" {
            tracing::warn!("No database configured. Data is kept in memory and lost on restart.");
        }

        tracing::info!(storage = state.storage, "Application state initialized");
        Ok(state)
    }

    /// State backed entirely by in-memory repositories.
    pub fn in_memory(jwt: JwtConfig, admin_emails: HashSet<String>) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            profile: Arc::new(InMemoryProfileRepository::new()),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            admin_emails: Arc::new(admin_emails),
            storage: "memory",
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(email)
    }
}
