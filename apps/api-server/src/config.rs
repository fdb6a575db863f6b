//! Application configuration loaded from environment variables.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use folio_infra::auth::{
    DEFAULT_EXPIRATION_HOURS, DEFAULT_ISSUER, DEFAULT_SECRET, JwtConfig, MAX_EXPIRATION_HOURS,
};
use folio_infra::database::DatabaseConfig;

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Request budget per client address.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

/// Configuration that would make the server unsafe to run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-default value in production")]
    InsecureSecret,

    #[error("JWT_EXPIRATION_HOURS must be between 1 and 87600, got {0}")]
    InvalidTokenLifetime(i64),

    #[error("FRONTEND_URL must be an http(s) origin, got {0:?}")]
    InvalidFrontendUrl(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Normalized emails that register with the admin role.
    pub admin_emails: HashSet<String>,
    pub rate_limit: RateLimitSettings,
    /// Browser origin allowed to call the API with credentials.
    pub frontend_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = Environment::parse(lookup("APP_ENV"));

        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 20),
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 2),
                sqlx_logging: environment == Environment::Development,
            });

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_SECRET.to_string()),
            expiration_hours: parse_or(&lookup, "JWT_EXPIRATION_HOURS", DEFAULT_EXPIRATION_HOURS),
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
        };

        if !(1..=MAX_EXPIRATION_HOURS).contains(&jwt.expiration_hours) {
            return Err(ConfigError::InvalidTokenLifetime(jwt.expiration_hours));
        }
        if jwt.uses_default_secret() || jwt.secret.trim().is_empty() {
            if environment == Environment::Production {
                return Err(ConfigError::InsecureSecret);
            }
            tracing::warn!("JWT_SECRET is not set; using the development default");
        }

        let frontend_url = parse_origin(lookup("FRONTEND_URL"))?;

        let admin_emails = lookup("ADMIN_EMAILS")
            .map(|list| parse_admin_emails(&list))
            .unwrap_or_default();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            environment,
            database,
            jwt,
            admin_emails,
            rate_limit: RateLimitSettings {
                max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 100),
                window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 900)),
            },
            frontend_url,
        })
    }
}

/// A scheme plus host origin, without the trailing slash browsers omit.
fn parse_origin(value: Option<String>) -> Result<String, ConfigError> {
    let raw = match value.as_deref().map(str::trim) {
        None | Some("") => return Ok(DEFAULT_FRONTEND_URL.to_string()),
        Some(raw) => raw,
    };

    let origin = raw.trim_end_matches('/');
    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    match host {
        Some(host) if !host.is_empty() && !host.contains(['/', '*']) => Ok(origin.to_string()),
        _ => Err(ConfigError::InvalidFrontendUrl(raw.to_string())),
    }
}

/// Comma-separated list, trimmed and lowercased like stored emails.
fn parse_admin_emails(list: &str) -> HashSet<String> {
    list.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Invalid number, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.database.is_none());
        assert_eq!(config.jwt.expiration_hours, 168);
        assert_eq!(config.jwt.issuer, "folio-api");
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert!(config.admin_emails.is_empty());
        assert_eq!(config.frontend_url, "http://localhost:5173");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config(&[
            ("PORT", "eighty"),
            ("DB_MAX_CONNECTIONS", "-1"),
            ("DATABASE_URL", "postgres://db/folio"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database.unwrap().max_connections, 20);
    }

    #[test]
    fn test_production_refuses_default_secret() {
        assert!(matches!(
            config(&[("APP_ENV", "production")]),
            Err(ConfigError::InsecureSecret)
        ));
        assert!(config(&[("APP_ENV", "production"), ("JWT_SECRET", "a-real-secret")]).is_ok());
    }

    #[test]
    fn test_non_positive_lifetime_is_rejected() {
        assert!(matches!(
            config(&[("JWT_EXPIRATION_HOURS", "0")]),
            Err(ConfigError::InvalidTokenLifetime(0))
        ));
    }

    #[test]
    fn test_huge_lifetime_is_rejected() {
        assert!(matches!(
            config(&[("JWT_EXPIRATION_HOURS", "1000000")]),
            Err(ConfigError::InvalidTokenLifetime(1_000_000))
        ));
        assert!(config(&[("JWT_EXPIRATION_HOURS", "87600")]).is_ok());
    }

    #[test]
    fn test_frontend_url_is_an_origin() {
        let config_with = |url| config(&[("FRONTEND_URL", url)]);

        assert_eq!(
            config_with(" https://folio.example.com/ ").unwrap().frontend_url,
            "https://folio.example.com"
        );
        assert!(matches!(
            config_with("*"),
            Err(ConfigError::InvalidFrontendUrl(_))
        ));
        assert!(matches!(
            config_with("https://folio.example.com/app"),
            Err(ConfigError::InvalidFrontendUrl(_))
        ));
        assert!(matches!(
            config_with("folio.example.com"),
            Err(ConfigError::InvalidFrontendUrl(_))
        ));
    }

    #[test]
    fn test_admin_emails_are_normalized() {
        let config = config(&[("ADMIN_EMAILS", " Owner@Example.com, ,ops@example.com")]).unwrap();

        assert_eq!(config.admin_emails.len(), 2);
        assert!(config.admin_emails.contains("owner@example.com"));
    }
}
