//! Cross-origin access for the browser frontend.

use actix_cors::Cors;
use actix_web::http::{Method, header};

use crate::observability::REQUEST_ID_HEADER;

/// CORS policy admitting `frontend_url` with credentials.
///
/// Requests from other origins are still served, just without the
/// `Access-Control-Allow-*` headers, so browsers refuse to expose them.
pub fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allowed_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(REQUEST_ID_HEADER)
        .expose_headers([REQUEST_ID_HEADER])
        .supports_credentials()
        .block_on_origin_mismatch(false)
        .max_age(3600)
}
