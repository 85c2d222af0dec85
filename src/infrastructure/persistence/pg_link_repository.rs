//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{Error, Result};
use crate::utils::db_error::map_sqlx_error;

const LINK_COLUMNS: &str =
    "id, original_url, slug, access_count, created_at, updated_at, last_accessed_at, deleted_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    original_url: String,
    slug: String,
    access_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            original_url: row.original_url,
            slug: row.slug,
            access_count: row.access_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_accessed_at: row.last_accessed_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Slug uniqueness is enforced by the `links_slug_unique` partial index, so a
/// colliding insert fails as a single statement and leaves no row behind.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link> {
        const OP: &str = "link_repository.create";

        let query = format!(
            "INSERT INTO links (id, original_url, slug) VALUES ($1, $2, $3) RETURNING {}",
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(new_link.id)
            .bind(&new_link.original_url)
            .bind(&new_link.slug)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        Ok(row.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Link> {
        const OP: &str = "link_repository.find_by_slug";

        let query = format!(
            "SELECT {} FROM links WHERE slug = $1 AND deleted_at IS NULL",
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        Ok(row.into())
    }

    async fn resolve_and_track(&self, slug: &str) -> Result<Link> {
        const OP: &str = "link_repository.resolve_and_track";

        let query = format!(
            r#"
            UPDATE links
            SET access_count = access_count + 1,
                last_accessed_at = now(),
                updated_at = now()
            WHERE slug = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            LINK_COLUMNS
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error(OP, e))?;

        Ok(row.into())
    }

    async fn soft_delete(&self, slug: &str) -> Result<()> {
        const OP: &str = "link_repository.soft_delete";

        let result = sqlx::query(
            "UPDATE links SET deleted_at = now(), updated_at = now() \
             WHERE slug = $1 AND deleted_at IS NULL",
        )
        .bind(slug)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| map_sqlx_error(OP, e))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(OP, format!("no live link with slug {}", slug)));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| map_sqlx_error("link_repository.ping", e))?;

        Ok(())
    }
}
