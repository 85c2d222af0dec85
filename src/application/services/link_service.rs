//! Link creation, resolution and deletion service.
//!
//! Owns the slug-assignment protocol: a caller-chosen slug gets exactly one
//! insert attempt, a generated slug gets up to `max_attempts` fresh candidates.
//! Uniqueness is decided by the store at insert time only; the service never
//! checks for an existing slug before writing.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{Error, Kind, Result};
use crate::utils::code_generator::SlugGenerator;
use crate::utils::id_generator::IdGenerator;
use crate::utils::validation::{
    MAX_SLUG_LENGTH, MIN_SLUG_LENGTH, check_slug_length, validate_slug, validate_url,
};

/// Length of generated slugs when none (or an out-of-range one) is configured.
pub const DEFAULT_SLUG_LENGTH: usize = 7;

/// Generated-slug attempts per create call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for [`LinkService`].
#[derive(Debug, Clone)]
pub struct LinkServiceConfig {
    /// Length of generated slugs. Values outside 3..=64 fall back to
    /// [`DEFAULT_SLUG_LENGTH`].
    pub slug_length: usize,
    /// Maximum generated-slug attempts. Zero falls back to [`DEFAULT_MAX_ATTEMPTS`].
    pub max_attempts: u32,
    /// Deadline applied to every store call.
    pub store_timeout: Duration,
}

impl Default for LinkServiceConfig {
    fn default() -> Self {
        Self {
            slug_length: DEFAULT_SLUG_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Service for creating, resolving and deleting shortened links.
///
/// Holds no mutable state: configuration is fixed at construction and the
/// collaborators are shared handles, so one instance serves all requests.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    slug_generator: Arc<dyn SlugGenerator>,
    id_generator: Arc<dyn IdGenerator>,
    slug_length: usize,
    max_attempts: u32,
    store_timeout: Duration,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        slug_generator: Arc<dyn SlugGenerator>,
        id_generator: Arc<dyn IdGenerator>,
        config: LinkServiceConfig,
    ) -> Self {
        let slug_length = if (MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&config.slug_length) {
            config.slug_length
        } else {
            tracing::warn!(
                configured = config.slug_length,
                fallback = DEFAULT_SLUG_LENGTH,
                "slug length out of range, using default"
            );
            DEFAULT_SLUG_LENGTH
        };

        let max_attempts = if config.max_attempts == 0 {
            DEFAULT_MAX_ATTEMPTS
        } else {
            config.max_attempts
        };

        Self {
            repository,
            slug_generator,
            id_generator,
            slug_length,
            max_attempts,
            store_timeout: config.store_timeout,
        }
    }

    /// Effective generated-slug length.
    pub fn slug_length(&self) -> usize {
        self.slug_length
    }

    /// Effective generated-slug attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Creates a short link, with a caller-chosen slug or a generated one.
    ///
    /// An empty `custom_slug` is treated the same as `None`.
    ///
    /// # Errors
    ///
    /// - [`Kind::Invalid`] if the URL or custom slug breaks the validation rules
    /// - [`Kind::Conflict`] if the custom slug is already taken (no retry)
    /// - [`Kind::Unavailable`] if every generated candidate collided, an
    ///   id or slug could not be generated, or the store is unreachable
    pub async fn create(&self, original_url: String, custom_slug: Option<String>) -> Result<Link> {
        const OP: &str = "link_service.create";

        validate_url(&original_url).map_err(|e| Error::invalid(OP, e))?;

        let custom_slug = custom_slug.filter(|slug| !slug.is_empty());
        if let Some(slug) = &custom_slug {
            validate_slug(slug).map_err(|e| Error::invalid(OP, e))?;
        }

        let id = self
            .id_generator
            .generate()
            .map_err(|e| Error::reclassify(OP, Kind::Unavailable, e))?;

        let link = match custom_slug {
            Some(slug) => {
                let new_link = NewLink {
                    id,
                    original_url,
                    slug,
                };
                let link = self.persist(new_link).await.map_err(|e| Error::wrap(OP, e))?;
                metrics::counter!("links_created_total", "path" => "custom").increment(1);
                link
            }
            None => self.create_with_generated_slug(OP, id, original_url).await?,
        };

        tracing::info!(link_id = %link.id, slug = %link.slug, "link created");
        Ok(link)
    }

    /// Retrieves a live link by slug without touching its access counters.
    ///
    /// # Errors
    ///
    /// - [`Kind::Invalid`] for an empty or out-of-range slug
    /// - [`Kind::NotFound`] if no live link has the slug
    /// - [`Kind::Unavailable`] on store failure
    pub async fn get_by_slug(&self, slug: &str) -> Result<Link> {
        const OP: &str = "link_service.get_by_slug";

        check_slug_length(slug).map_err(|e| Error::invalid(OP, e))?;

        self.with_deadline(
            "link_repository.find_by_slug",
            self.repository.find_by_slug(slug),
        )
        .await
        .map_err(|e| Error::wrap(OP, e))
    }

    /// Resolves a slug to its destination and records the access.
    ///
    /// # Errors
    ///
    /// Same classification as [`LinkService::get_by_slug`].
    pub async fn resolve(&self, slug: &str) -> Result<String> {
        const OP: &str = "link_service.resolve";

        if slug.is_empty() {
            return Err(Error::invalid(OP, "slug cannot be empty"));
        }

        let link = self
            .with_deadline(
                "link_repository.resolve_and_track",
                self.repository.resolve_and_track(slug),
            )
            .await
            .map_err(|e| Error::wrap(OP, e))?;

        metrics::counter!("links_resolved_total").increment(1);
        tracing::debug!(slug, access_count = link.access_count, "slug resolved");

        Ok(link.original_url)
    }

    /// Logically deletes a link. Deleting a missing link succeeds.
    ///
    /// # Errors
    ///
    /// - [`Kind::Invalid`] for an empty slug
    /// - [`Kind::Unavailable`] on store failure
    pub async fn delete(&self, slug: &str) -> Result<()> {
        const OP: &str = "link_service.delete";

        if slug.is_empty() {
            return Err(Error::invalid(OP, "slug cannot be empty"));
        }

        match self
            .with_deadline("link_repository.soft_delete", self.repository.soft_delete(slug))
            .await
        {
            Ok(()) => {
                tracing::info!(slug, "link deleted");
                Ok(())
            }
            Err(e) if e.kind() == Kind::NotFound => {
                tracing::debug!(slug, "delete of missing link ignored");
                Ok(())
            }
            Err(e) => Err(Error::wrap(OP, e)),
        }
    }

    /// Checks that the store answers within the deadline.
    pub async fn health_check(&self) -> Result<()> {
        const OP: &str = "link_service.health_check";

        self.with_deadline("link_repository.ping", self.repository.ping())
            .await
            .map_err(|e| Error::wrap(OP, e))
    }

    /// Generated-slug path: fresh candidate per attempt, retry on conflict only.
    async fn create_with_generated_slug(
        &self,
        op: &'static str,
        id: Uuid,
        original_url: String,
    ) -> Result<Link> {
        let mut last_conflict = None;

        for attempt in 1..=self.max_attempts {
            let slug = self
                .slug_generator
                .generate(self.slug_length)
                .map_err(|e| Error::reclassify(op, Kind::Unavailable, e))?;

            let new_link = NewLink {
                id,
                original_url: original_url.clone(),
                slug,
            };

            match self.persist(new_link).await {
                Ok(link) => {
                    metrics::counter!("links_created_total", "path" => "generated").increment(1);
                    return Ok(link);
                }
                Err(e) if e.kind() == Kind::Conflict => {
                    metrics::counter!("slug_collisions_total").increment(1);
                    tracing::debug!(attempt, error = %e, "generated slug collided");
                    last_conflict = Some(e);
                }
                Err(e) => return Err(Error::wrap(op, e)),
            }
        }

        metrics::counter!("slug_generation_exhausted_total").increment(1);

        match last_conflict {
            Some(last_conflict) => {
                tracing::warn!(
                    attempts = self.max_attempts,
                    slug_length = self.slug_length,
                    error = %last_conflict,
                    "no unique slug found within attempt budget"
                );
                Err(Error::reclassify(op, Kind::Unavailable, last_conflict))
            }
            None => Err(Error::unavailable(op, "no slug generation attempts were made")),
        }
    }

    async fn persist(&self, new_link: NewLink) -> Result<Link> {
        self.with_deadline("link_repository.create", self.repository.create(new_link))
            .await
    }

    /// Bounds a store call by `store_timeout`.
    async fn with_deadline<T>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::deadline_exceeded(op)),
        }
    }
}
