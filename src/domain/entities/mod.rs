//! Core domain entities representing the business data model.
//!
//! - [`Link`] - A shortened URL mapping with access tracking
//! - [`NewLink`] - Input for creating a link

pub mod link;

pub use link::{Link, NewLink};
