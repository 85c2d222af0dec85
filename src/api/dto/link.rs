//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::Link;

/// Request to create a short link.
///
/// A missing `url` deserializes as empty so it is reported by validation
/// rather than as a malformed body.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateLinkRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,

    /// Optional caller-chosen slug. Empty means "generate one".
    #[serde(default)]
    pub custom_slug: Option<String>,
}

/// Response for a newly created link.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub id: Uuid,
    pub slug: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}

impl CreateLinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &link.slug),
            id: link.id,
            slug: link.slug,
            original_url: link.original_url,
            created_at: link.created_at,
        }
    }
}

/// Full view of a live link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub slug: String,
    pub original_url: String,
    pub short_url: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &link.slug),
            id: link.id,
            slug: link.slug,
            original_url: link.original_url,
            access_count: link.access_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
            last_accessed_at: link.last_accessed_at,
        }
    }
}

fn short_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}
