//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A shortened URL with its access-tracking metadata.
///
/// `id` is the storage primary key; callers address links by `slug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: Uuid,
    pub original_url: String,
    pub slug: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Builds a freshly created, never resolved link.
    pub fn new(id: Uuid, original_url: String, slug: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            original_url,
            slug,
            access_count: 0,
            created_at,
            updated_at: created_at,
            last_accessed_at: None,
            deleted_at: None,
        }
    }

    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Records one successful resolution at `at`.
    pub fn record_access(&mut self, at: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed_at = Some(at);
        self.updated_at = at;
    }

    /// Marks the link as logically deleted at `at`.
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at;
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: Uuid,
    pub original_url: String,
    pub slug: String,
}

impl NewLink {
    /// Materializes the row a store would persist for this input.
    pub fn into_link(self, created_at: DateTime<Utc>) -> Link {
        Link::new(self.id, self.original_url, self.slug, created_at)
    }
}
