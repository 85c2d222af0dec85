#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use axum_test::TestServer;
use slug_shortener::application::services::{LinkService, LinkServiceConfig};
use slug_shortener::error::Result;
use slug_shortener::infrastructure::persistence::InMemoryLinkRepository;
use slug_shortener::routes::{app_router, router};
use slug_shortener::state::AppState;
use slug_shortener::utils::code_generator::{Base62Generator, SlugGenerator};
use slug_shortener::utils::id_generator::UuidV7Generator;

pub const BASE_URL: &str = "http://sho.rt";

/// Always returns the same candidate.
pub struct FixedSlugGenerator(pub &'static str);

impl SlugGenerator for FixedSlugGenerator {
    fn generate(&self, _length: usize) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub fn create_service(
    repository: Arc<InMemoryLinkRepository>,
    slug_generator: Arc<dyn SlugGenerator>,
) -> LinkService {
    LinkService::new(
        repository,
        slug_generator,
        Arc::new(UuidV7Generator::new()),
        LinkServiceConfig {
            store_timeout: Duration::from_secs(1),
            ..LinkServiceConfig::default()
        },
    )
}

pub fn create_test_state() -> (AppState, Arc<InMemoryLinkRepository>) {
    create_test_state_with(Arc::new(Base62Generator::new()))
}

pub fn create_test_state_with(
    slug_generator: Arc<dyn SlugGenerator>,
) -> (AppState, Arc<InMemoryLinkRepository>) {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let service = create_service(repository.clone(), slug_generator);
    let state = AppState::new(Arc::new(service), BASE_URL, "url-shortener-test");
    (state, repository)
}

pub fn create_test_server() -> (TestServer, Arc<InMemoryLinkRepository>) {
    let (state, repository) = create_test_state();
    (TestServer::new(router(state)).unwrap(), repository)
}

/// Test server over the full application, trailing-slash normalization included.
pub fn create_app_server() -> (TestServer, Arc<InMemoryLinkRepository>) {
    let (state, repository) = create_test_state();
    let app = ServiceExt::<Request>::into_make_service(app_router(state));
    (TestServer::new(app).unwrap(), repository)
}
