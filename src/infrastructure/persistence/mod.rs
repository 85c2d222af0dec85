//! Repository implementations.
//!
//! Concrete implementations of the domain [`crate::domain::repositories::LinkRepository`]
//! trait.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryLinkRepository`] - process-local storage for development and tests

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::InMemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
