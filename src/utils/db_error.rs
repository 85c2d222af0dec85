//! Translation of `sqlx` failures into the service error taxonomy.
//!
//! This is the only module that looks at PostgreSQL error shapes. Everything
//! above the repository sees [`Error`] with a [`crate::error::Kind`] already
//! decided here.

use crate::error::Error;

/// Partial unique index guarding live slugs.
pub const SLUG_UNIQUE_CONSTRAINT: &str = "links_slug_unique";

/// True if `e` is a unique violation on [`SLUG_UNIQUE_CONSTRAINT`].
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(SLUG_UNIQUE_CONSTRAINT))
}

/// Classifies a storage failure.
///
/// - no row → `NotFound`
/// - slug unique violation → `Conflict`
/// - anything else, other constraints included → `Unavailable`
pub fn map_sqlx_error(op: &'static str, e: sqlx::Error) -> Error {
    if matches!(e, sqlx::Error::RowNotFound) {
        return Error::not_found(op, e);
    }

    if is_unique_violation_on_slug(&e) {
        return Error::conflict(op, e);
    }

    Error::unavailable(op, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = map_sqlx_error("link_repository.find_by_slug", sqlx::Error::RowNotFound);

        assert_eq!(err.kind(), Kind::NotFound);
        assert_eq!(err.op(), "link_repository.find_by_slug");
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err = map_sqlx_error("link_repository.create", sqlx::Error::PoolTimedOut);

        assert_eq!(err.kind(), Kind::Unavailable);
        assert!(!is_unique_violation_on_slug(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_protocol_error_maps_to_unavailable() {
        let err = map_sqlx_error(
            "link_repository.create",
            sqlx::Error::Protocol("unexpected message".to_string()),
        );

        assert_eq!(err.kind(), Kind::Unavailable);
    }
}
