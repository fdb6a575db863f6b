//! Authentication extractors.
//!
//! `CurrentUser` requires a valid bearer token whose subject still exists,
//! `AdminUser` additionally requires the admin role, and `MaybeUser` resolves
//! the caller when it can and falls back to anonymous otherwise.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use folio_core::domain::User;
use folio_core::ports::{AuthError, BaseRepository};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// An authenticated caller.
///
/// ```ignore
/// async fn me(user: CurrentUser) -> impl Responder {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// The caller if a usable token was sent, otherwise anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(User::is_admin)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let value = value.to_str().map_err(|_| AuthError::MissingAuth)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingAuth)
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
        AppError::Internal("AppState not registered as app data".to_string())
    })
}

/// Verify the token and load the user it names.
async fn authenticate(state: &AppState, token: &str) -> Result<User, AppError> {
    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::from(e)
    })?;

    state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AuthError::UnknownSubject.into())
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = app_state(req);

        Box::pin(async move {
            let state = state?;
            let token = token?;
            authenticate(&state, &token).await.map(CurrentUser)
        })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);

        Box::pin(async move {
            let CurrentUser(user) = current.await?;
            if !user.is_admin() {
                tracing::warn!(user_id = %user.id, "Non-admin attempted an admin operation");
                return Err(AuthError::InsufficientPermissions.into());
            }
            Ok(AdminUser(user))
        })
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req).ok();
        let state = app_state(req);

        Box::pin(async move {
            let state = state?;
            let Some(token) = token else {
                return Ok(MaybeUser(None));
            };

            match authenticate(&state, &token).await {
                Ok(user) => Ok(MaybeUser(Some(user))),
                // Storage failures still surface; bad credentials just mean anonymous.
                Err(AppError::Internal(detail)) => Err(AppError::Internal(detail)),
                Err(_) => Ok(MaybeUser(None)),
            }
        })
    }
}
