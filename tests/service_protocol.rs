mod common;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use slug_shortener::domain::repositories::LinkRepository;
use slug_shortener::error::{Kind, Result};
use slug_shortener::infrastructure::persistence::InMemoryLinkRepository;
use slug_shortener::utils::code_generator::{Base62Generator, SlugGenerator};

/// Hands out candidates in order, then repeats the last one.
struct ScriptedSlugGenerator {
    candidates: Mutex<Vec<&'static str>>,
    calls: Mutex<usize>,
}

impl ScriptedSlugGenerator {
    fn new(candidates: &[&'static str]) -> Self {
        let mut candidates = candidates.to_vec();
        candidates.reverse();
        Self {
            candidates: Mutex::new(candidates),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SlugGenerator for ScriptedSlugGenerator {
    fn generate(&self, _length: usize) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        let mut candidates = self.candidates.lock().unwrap();
        let next = if candidates.len() > 1 {
            candidates.pop().unwrap()
        } else {
            candidates[0]
        };
        Ok(next.to_string())
    }
}

#[tokio::test]
async fn test_fixed_generator_end_to_end() {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let service = common::create_service(
        repository.clone(),
        Arc::new(common::FixedSlugGenerator("abc1234")),
    );

    let link = service
        .create("https://example.com/x".to_string(), Some(String::new()))
        .await
        .unwrap();

    assert_eq!(link.slug, "abc1234");
    assert_eq!(link.original_url, "https://example.com/x");
    assert_eq!(link.access_count, 0);

    let err = service
        .create("https://example.com/x".to_string(), Some(String::new()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Unavailable);
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn test_retry_after_collision_leaves_no_residue() {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let seeding = common::create_service(
        repository.clone(),
        Arc::new(common::FixedSlugGenerator("unused")),
    );
    seeding
        .create("https://example.com/first".to_string(), Some("taken01".to_string()))
        .await
        .unwrap();

    let generator = Arc::new(ScriptedSlugGenerator::new(&["taken01", "fresh01"]));
    let service = common::create_service(repository.clone(), generator.clone());

    let link = service
        .create("https://example.com/second".to_string(), None)
        .await
        .unwrap();

    assert_eq!(link.slug, "fresh01");
    assert_eq!(generator.calls(), 2);
    assert_eq!(repository.len(), 2);
    assert_eq!(
        repository.find_by_slug("taken01").await.unwrap().original_url,
        "https://example.com/first"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_yield_unique_slugs() {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let service = Arc::new(common::create_service(
        repository.clone(),
        Arc::new(Base62Generator::new()),
    ));

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create(format!("https://example.com/{}", i), None)
                    .await
            })
        })
        .collect();

    let mut slugs = HashSet::new();
    let mut ids = HashSet::new();
    for handle in handles {
        let link = handle.await.unwrap().unwrap();
        assert!(slugs.insert(link.slug));
        assert!(ids.insert(link.id));
    }

    assert_eq!(repository.len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contested_custom_slug_has_one_winner() {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let service = Arc::new(common::create_service(
        repository.clone(),
        Arc::new(Base62Generator::new()),
    ));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create(
                        format!("https://example.com/{}", i),
                        Some("contested".to_string()),
                    )
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.kind(), Kind::Conflict),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(repository.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_are_cumulative() {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let service = Arc::new(common::create_service(
        repository.clone(),
        Arc::new(Base62Generator::new()),
    ));

    let created = service
        .create("https://example.com".to_string(), Some("popular".to_string()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let before_resolves = Utc::now();

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.resolve("popular").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "https://example.com");
    }

    let link = service.get_by_slug("popular").await.unwrap();
    assert_eq!(link.access_count, 100);
    let last_accessed = link.last_accessed_at.unwrap();
    assert!(last_accessed >= before_resolves);
    assert!(last_accessed > created.created_at);
    assert_eq!(link.updated_at, last_accessed);

    let after = service.resolve("popular").await.map(|_| Utc::now()).unwrap();
    let link = service.get_by_slug("popular").await.unwrap();
    assert!(link.last_accessed_at.unwrap() > last_accessed);
    assert!(link.last_accessed_at.unwrap() <= after);
}
