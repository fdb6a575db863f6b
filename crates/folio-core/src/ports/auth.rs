//! Authentication and authorization ports.

use uuid::Uuid;

/// Claims carried by an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issues and verifies signed, time-bounded identity tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token whose subject is `user_id`.
    fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Check signature, issuer and expiry, then decode the claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Token lifetime in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Token configuration error: {0}")]
    Misconfigured(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
