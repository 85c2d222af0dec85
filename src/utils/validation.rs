//! Input validation for destination URLs and slugs.
//!
//! Both checks return a [`ValidationError`] describing the first rule that
//! failed. The link service classifies these as
//! [`crate::error::Kind::Invalid`].

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Maximum accepted length of a destination URL, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Shortest slug accepted anywhere in the service.
pub const MIN_SLUG_LENGTH: usize = 3;

/// Longest slug accepted anywhere in the service.
pub const MAX_SLUG_LENGTH: usize = 64;

/// Alphanumeric at both ends, `_` and `-` allowed in between.
static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9_-]*[A-Za-z0-9])?$").unwrap());

/// Reasons a URL or slug is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("url cannot be empty")]
    EmptyUrl,

    #[error("url too long (max {MAX_URL_LENGTH} characters)")]
    UrlTooLong,

    #[error("invalid url format: {0}")]
    InvalidUrl(String),

    #[error("url scheme must be http or https")]
    UnsupportedScheme,

    #[error("url must include host")]
    MissingHost,

    #[error("slug cannot be empty")]
    EmptySlug,

    #[error("slug too short (minimum {MIN_SLUG_LENGTH} characters)")]
    SlugTooShort,

    #[error("slug too long (maximum {MAX_SLUG_LENGTH} characters)")]
    SlugTooLong,

    #[error("slug contains invalid characters (only alphanumeric, dash, and underscore allowed)")]
    InvalidSlugCharacters,

    #[error("slug cannot start or end with dash or underscore")]
    InvalidSlugBoundary,
}

/// Validates a destination URL.
///
/// # Rules
///
/// - Non-empty, at most [`MAX_URL_LENGTH`] characters
/// - Parses as an absolute URL
/// - Scheme is `http` or `https`
/// - Host is present and non-empty
///
/// The URL is stored exactly as given; no normalization is applied.
pub fn validate_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    if raw.chars().count() > MAX_URL_LENGTH {
        return Err(ValidationError::UrlTooLong);
    }

    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost);
    }

    Ok(())
}

/// Validates a caller-chosen slug.
///
/// # Rules
///
/// - Length between [`MIN_SLUG_LENGTH`] and [`MAX_SLUG_LENGTH`]
/// - Characters from `[A-Za-z0-9_-]`
/// - Does not start or end with `_` or `-`
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    check_slug_length(slug)?;

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidSlugCharacters);
    }

    if !SLUG_REGEX.is_match(slug) {
        return Err(ValidationError::InvalidSlugBoundary);
    }

    Ok(())
}

/// Length-only slug check used on lookups, where the charset is left to the
/// store (an unknown slug simply does not exist).
pub fn check_slug_length(slug: &str) -> Result<(), ValidationError> {
    let length = slug.chars().count();

    if length == 0 {
        return Err(ValidationError::EmptySlug);
    }
    if length < MIN_SLUG_LENGTH {
        return Err(ValidationError::SlugTooShort);
    }
    if length > MAX_SLUG_LENGTH {
        return Err(ValidationError::SlugTooLong);
    }

    Ok(())
}
