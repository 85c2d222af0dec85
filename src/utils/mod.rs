//! Building blocks shared by the service and storage layers.
//!
//! - [`code_generator`] - Random slug generation
//! - [`id_generator`] - Time-ordered record identifiers
//! - [`validation`] - URL and slug validation rules
//! - [`db_error`] - Storage error classification

pub mod code_generator;
pub mod db_error;
pub mod id_generator;
pub mod validation;
