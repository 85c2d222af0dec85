//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service operations and formats
//! responses according to API contracts.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`error`] - Request-level error responses
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request id and tracing middleware
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
