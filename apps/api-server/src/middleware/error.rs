//! HTTP-facing error type and its envelope rendering.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use folio_core::ports::AuthError;
use folio_core::{DomainError, RepoError};
use folio_shared::{ErrorResponse, FieldError};

/// Application-level error type; every variant renders as the error envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests, retry after {0}s")]
    TooManyRequests(u64),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// The envelope for this error; internal details never leave the process.
    pub fn body(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(message) => ErrorResponse::not_found(message),
            AppError::BadRequest(message) => ErrorResponse::bad_request(message),
            AppError::Unauthorized(message) => ErrorResponse::unauthorized(message),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(message) => ErrorResponse::conflict(message),
            AppError::TooManyRequests(secs) => ErrorResponse::too_many_requests(*secs),
            AppError::Internal(_) => ErrorResponse::internal_error(),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
        }
    }

    /// Render the response, optionally tagging the body with the request id.
    pub fn render(&self, request_id: Option<&str>) -> HttpResponse {
        let mut body = self.body();
        if let Some(id) = request_id {
            body = body.with_request_id(id);
        }

        let mut response = HttpResponse::build(self.status_code());
        if let AppError::TooManyRequests(secs) = self {
            response.insert_header((header::RETRY_AFTER, secs.to_string()));
        }
        response.json(body)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!(error = %detail, "Internal error");
        }
        self.render(None)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation { field, message } => AppError::validation(field, message),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(detail) => {
                tracing::warn!(%detail, "Constraint violation");
                AppError::Conflict("Conflict with existing data".to_string())
            }
            RepoError::Rejected(err) => err.into(),
            RepoError::Connection(message) => {
                AppError::Internal(format!("database connection: {message}"))
            }
            RepoError::Query(message) => AppError::Internal(format!("database query: {message}")),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth => {
                AppError::Unauthorized("Not authorized, no token supplied".to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Not authorized, invalid or expired token".to_string())
            }
            AuthError::UnknownSubject => {
                AppError::Unauthorized("Not authorized, user no longer exists".to_string())
            }
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::InsufficientPermissions => AppError::Forbidden,
            AuthError::HashingError(message) | AuthError::Misconfigured(message) => {
                AppError::Internal(message)
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
