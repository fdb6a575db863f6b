//! # Folio API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use tracing_actix_web::TracingLogger;

use api_server::config::AppConfig;
use api_server::handlers;
use api_server::middleware::{RateLimitMiddleware, cors};
use api_server::observability::RequestIdMiddleware;
use api_server::state::AppState;
use api_server::telemetry::{TelemetryConfig, init_telemetry};
use folio_core::ports::RateLimiter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    let config = AppConfig::from_env()?;

    tracing::info!(
        service = %telemetry.service_name,
        environment = ?config.environment,
        frontend = %config.frontend_url,
        "Starting Folio API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let limiter = build_rate_limiter(&config);
    let frontend_url = config.frontend_url.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(RateLimitMiddleware::new(limiter.clone(), "/api"))
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("Referrer-Policy", "no-referrer")),
            )
            .wrap(cors(&frontend_url))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "rate-limit")]
fn build_rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    use folio_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};

    Some(Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window: config.rate_limit.window,
    })))
}

#[cfg(not(feature = "rate-limit"))]
fn build_rate_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    tracing::warn!("Rate limiting is disabled in this build");
    None
}
