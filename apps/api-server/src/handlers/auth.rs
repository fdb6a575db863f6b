//! Authentication handlers.

use actix_web::{HttpResponse, web};

use folio_core::domain::{Role, User};
use folio_core::error::RepoError;
use folio_core::ports::{AuthError, BaseRepository};
use folio_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use super::{created, ok, user_response, validate};
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = state.tokens.issue(user.id)?;

    Ok(AuthResponse {
        user: user_response(user),
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: u64::try_from(state.tokens.expiration_seconds()).unwrap_or_default(),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate(&req)?;

    let email = normalize_email(&req.email);
    let username = req.username.trim().to_string();

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let role = if state.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };

    // The unique indexes still catch a concurrent registration of the same account.
    let user = state
        .users
        .insert(User::new(username, email, password_hash, role))
        .await
        .map_err(|e| match e {
            RepoError::Constraint(_) => {
                AppError::Conflict("Email or username already registered".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(created(
        auth_response(&state, &user)?,
        "User registered successfully",
    ))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate(&req)?;

    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(ok(auth_response(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> AppResult<HttpResponse> {
    Ok(ok(user_response(&user)))
}
