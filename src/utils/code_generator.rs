//! Random slug generation.
//!
//! Provides the [`SlugGenerator`] capability used by the link service and its
//! production implementation, [`Base62Generator`], which draws from the
//! operating system CSPRNG.

use crate::error::{Error, Result};

/// Alphabet used for generated slugs: digits, upper case, lower case.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Largest multiple of 62 that fits in a byte. Bytes at or above it are
/// discarded so every character is equally likely.
const REJECTION_THRESHOLD: u8 = 248;

/// Produces slug candidates of a requested length.
///
/// Implementations must be stateless from the caller's perspective and safe
/// to share across tasks.
#[cfg_attr(test, mockall::automock)]
pub trait SlugGenerator: Send + Sync {
    /// Generates a candidate of exactly `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Invalid`] if `length` is zero and
    /// [`crate::error::Kind::Unavailable`] if the entropy source fails.
    fn generate(&self, length: usize) -> Result<String>;
}

/// Cryptographically secure base62 slug generator.
///
/// Uses `getrandom` for entropy. Never falls back to a weaker source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base62Generator;

impl Base62Generator {
    pub fn new() -> Self {
        Self
    }
}

impl SlugGenerator for Base62Generator {
    fn generate(&self, length: usize) -> Result<String> {
        const OP: &str = "slug_generator.generate";

        if length == 0 {
            return Err(Error::invalid(OP, "length must be positive"));
        }

        let mut slug = String::with_capacity(length);
        // Rejection discards ~3% of bytes, so a slightly larger buffer usually
        // fills the slug in one read.
        let mut buffer = vec![0u8; length + length / 8 + 4];

        while slug.len() < length {
            getrandom::fill(&mut buffer).map_err(|e| Error::unavailable(OP, e.to_string()))?;

            for &byte in &buffer {
                if byte >= REJECTION_THRESHOLD {
                    continue;
                }
                slug.push(BASE62_ALPHABET[(byte % 62) as usize] as char);
                if slug.len() == length {
                    break;
                }
            }
        }

        Ok(slug)
    }
}
