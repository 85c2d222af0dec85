//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, identifier generation and the slug retry protocol. Services
//! consume repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and deletion

pub mod services;
