//! # Folio API Server
//!
//! HTTP surface of the portfolio and blog: configuration, shared state,
//! middleware and route handlers. The binary in `main.rs` wires these into
//! an Actix-web server.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
