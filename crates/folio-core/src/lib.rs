//! # Folio Core
//!
//! The domain layer of the Folio portfolio API.
//! Entities, the content rules attached to them, and the ports infrastructure must implement.
//! No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
