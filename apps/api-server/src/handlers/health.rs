//! Service index and health check endpoints.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use super::ok;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub auth: &'static str,
    pub blog: &'static str,
    pub profile: &'static str,
}

/// GET /
pub async fn index() -> HttpResponse {
    ok(IndexResponse {
        name: "Folio API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/api/health",
            auth: "/api/auth",
            blog: "/api/blog",
            profile: "/api/profile",
        },
    })
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::Value;

    use crate::handlers::test_support::{self, test_app};

    #[actix_web::test]
    async fn test_health_reports_storage() {
        let app = test_app!(test_support::state());

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["storage"], "memory");
    }

    #[actix_web::test]
    async fn test_index_lists_endpoints() {
        let app = test_app!(test_support::state());

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["endpoints"]["blog"], "/api/blog");
    }
}
