//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::LinkService;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Prefix for `short_url` in responses, without trailing slash.
    pub base_url: Arc<str>,
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, base_url: &str, service_name: &str) -> Self {
        Self {
            link_service,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            service_name: Arc::from(service_name),
        }
    }
}
