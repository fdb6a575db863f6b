//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;
mod profile;

use actix_web::{HttpResponse, web};

use folio_core::DomainError;
use folio_core::domain::User;
use folio_shared::dto::UserResponse;
use folio_shared::{ApiResponse, Validate, Violations};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes and the extractor error handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .route("/", web::get().to(health::index))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                // Blog routes
                .service(
                    web::scope("/blog")
                        .route("", web::get().to(blog::list_posts))
                        .route("", web::post().to(blog::create_post))
                        .route("/{slug}", web::get().to(blog::get_post))
                        .route("/{slug}/view", web::post().to(blog::record_view))
                        .route("/{id}", web::put().to(blog::update_post))
                        .route("/{id}", web::delete().to(blog::delete_post))
                        .route("/{id}/publish", web::patch().to(blog::toggle_publish)),
                )
                // Profile routes
                .service(
                    web::scope("/profile")
                        .route("", web::get().to(profile::get_profile))
                        .route("", web::post().to(profile::create_profile))
                        .route("", web::put().to(profile::update_profile))
                        .route("/experience", web::post().to(profile::add_experience))
                        .route("/experience/{id}", web::put().to(profile::update_experience))
                        .route("/experience/{id}", web::delete().to(profile::delete_experience))
                        .route("/education", web::post().to(profile::add_education))
                        .route("/education/{id}", web::put().to(profile::update_education))
                        .route("/education/{id}", web::delete().to(profile::delete_education))
                        .route("/skills", web::post().to(profile::add_skill))
                        .route("/skills/{id}", web::put().to(profile::update_skill))
                        .route("/skills/{id}", web::delete().to(profile::delete_skill)),
                ),
        )
        .default_service(web::to(route_not_found));
}

/// Anything no route claims, including a known path with an unrouted method.
async fn route_not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("Route not found".to_string()))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid JSON body: {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {err}")).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path parameter: {err}")).into()
    })
}

/// Run the request's own shape checks.
fn validate(request: &impl Validate) -> Result<(), AppError> {
    request.validate().map_err(AppError::Validation)
}

/// Record a rule failure from the domain next to the request's own field errors.
fn push_domain_error(v: &mut Violations, err: DomainError) {
    match err {
        DomainError::Validation { field, message } => v.push(field, message),
        other => v.push("", other.to_string()),
    }
}

/// Trim an optional string, treating blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
    }
}

fn ok<T: serde::Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

fn created<T: serde::Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok_with_message(data, message))
}
