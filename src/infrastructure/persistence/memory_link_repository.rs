//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet, mapref::entry::Entry};
use uuid::Uuid;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{Error, Result};

/// Process-local link store backed by sharded maps.
///
/// Live links are keyed by slug, so the slug entry lock is the uniqueness
/// check and the counter increment happens under the same lock as the read.
/// Soft-deleted links move to a separate map keyed by id and free their slug.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    live: DashMap<String, Link>,
    deleted: DashMap<Uuid, Link>,
    ids: DashSet<Uuid>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live links.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link> {
        const OP: &str = "link_repository.create";

        match self.live.entry(new_link.slug.clone()) {
            Entry::Occupied(_) => Err(Error::conflict(
                OP,
                format!("slug {} is already in use", new_link.slug),
            )),
            Entry::Vacant(vacant) => {
                if !self.ids.insert(new_link.id) {
                    return Err(Error::unavailable(
                        OP,
                        format!("duplicate link id {}", new_link.id),
                    ));
                }
                let link = new_link.into_link(Utc::now());
                vacant.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Link> {
        self.live
            .get(slug)
            .map(|link| link.clone())
            .ok_or_else(|| {
                Error::not_found(
                    "link_repository.find_by_slug",
                    format!("no live link with slug {}", slug),
                )
            })
    }

    async fn resolve_and_track(&self, slug: &str) -> Result<Link> {
        let Some(mut link) = self.live.get_mut(slug) else {
            return Err(Error::not_found(
                "link_repository.resolve_and_track",
                format!("no live link with slug {}", slug),
            ));
        };

        link.record_access(Utc::now());
        Ok(link.clone())
    }

    async fn soft_delete(&self, slug: &str) -> Result<()> {
        let Some((_, mut link)) = self.live.remove(slug) else {
            return Err(Error::not_found(
                "link_repository.soft_delete",
                format!("no live link with slug {}", slug),
            ));
        };

        link.mark_deleted(Utc::now());
        self.deleted.insert(link.id, link);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;
    use std::sync::Arc;
    use std::time::Duration;

    fn new_link(slug: &str) -> NewLink {
        NewLink {
            id: Uuid::now_v7(),
            original_url: "https://example.com".to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryLinkRepository::new();

        let created = repo.create(new_link("abc123")).await.unwrap();
        assert_eq!(created.access_count, 0);
        assert!(created.last_accessed_at.is_none());

        let found = repo.find_by_slug("abc123").await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let repo = InMemoryLinkRepository::new();

        let err = repo.find_by_slug("nope").await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn test_taken_slug_conflicts_and_leaves_nothing_behind() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("abc123")).await.unwrap();

        let second = new_link("abc123");
        let second_id = second.id;
        let err = repo.create(second).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Conflict);
        assert_eq!(repo.len(), 1);
        assert!(!repo.ids.contains(&second_id));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_not_a_conflict() {
        let repo = InMemoryLinkRepository::new();
        let first = new_link("first");
        let id = first.id;
        repo.create(first).await.unwrap();

        let err = repo
            .create(NewLink {
                id,
                original_url: "https://example.com".to_string(),
                slug: "second".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Unavailable);
        assert!(repo.find_by_slug("second").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_increments_counter() {
        let repo = InMemoryLinkRepository::new();
        let created = repo.create(new_link("abc123")).await.unwrap();

        let first = repo.resolve_and_track("abc123").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let before_last = Utc::now();
        let link = repo.resolve_and_track("abc123").await.unwrap();

        assert_eq!(link.access_count, 2);
        let last_accessed = link.last_accessed_at.unwrap();
        assert!(last_accessed >= before_last);
        assert!(last_accessed > first.last_accessed_at.unwrap());
        assert!(last_accessed > created.created_at);
        assert_eq!(link.updated_at, last_accessed);
        assert_eq!(repo.find_by_slug("abc123").await.unwrap(), link);
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let repo = InMemoryLinkRepository::new();

        let err = repo.resolve_and_track("nope").await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_link_and_frees_slug() {
        let repo = InMemoryLinkRepository::new();
        let created = repo.create(new_link("abc123")).await.unwrap();

        repo.soft_delete("abc123").await.unwrap();

        assert_eq!(
            repo.find_by_slug("abc123").await.unwrap_err().kind(),
            Kind::NotFound
        );
        assert_eq!(
            repo.resolve_and_track("abc123").await.unwrap_err().kind(),
            Kind::NotFound
        );
        assert!(repo.deleted.get(&created.id).unwrap().is_deleted());

        repo.create(new_link("abc123")).await.unwrap();
    }

    #[tokio::test]
    async fn test_soft_delete_missing_is_not_found() {
        let repo = InMemoryLinkRepository::new();

        let err = repo.soft_delete("nope").await.unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_same_slug_admit_one() {
        let repo = Arc::new(InMemoryLinkRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create(new_link("contested")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(e.kind(), Kind::Conflict),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_lose_no_updates() {
        let repo = Arc::new(InMemoryLinkRepository::new());
        repo.create(new_link("hot")).await.unwrap();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.resolve_and_track("hot").await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.find_by_slug("hot").await.unwrap().access_count, 64);
    }
}
