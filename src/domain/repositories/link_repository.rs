//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::Result;
use async_trait::async_trait;

/// Storage boundary for links.
///
/// Implementations own two guarantees the service relies on:
///
/// - slug uniqueness among live links is enforced at write time, and a
///   rejected write leaves nothing behind
/// - [`LinkRepository::resolve_and_track`] increments the access counter in a
///   single atomic step
///
/// Every error returned is already classified (see [`crate::error::Kind`]).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Conflict`] if a live link already uses the slug.
    /// Returns [`crate::error::Kind::Unavailable`] on storage failures.
    async fn create(&self, new_link: NewLink) -> Result<Link>;

    /// Finds a live link by slug.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::NotFound`] if no live link has the slug.
    /// Returns [`crate::error::Kind::Unavailable`] on storage failures.
    async fn find_by_slug(&self, slug: &str) -> Result<Link>;

    /// Increments `access_count`, sets `last_accessed_at`, and returns the
    /// updated row, as one atomic operation.
    ///
    /// # Errors
    ///
    /// Same as [`LinkRepository::find_by_slug`].
    async fn resolve_and_track(&self, slug: &str) -> Result<Link>;

    /// Soft-deletes a link by setting `deleted_at = now()`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::NotFound`] if no live link has the slug.
    /// Returns [`crate::error::Kind::Unavailable`] on storage failures.
    async fn soft_delete(&self, slug: &str) -> Result<()>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Unavailable`] if it is not.
    async fn ping(&self) -> Result<()>;
}
