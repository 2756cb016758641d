//! Shared error mapping for Diesel repository implementations.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::VenueRepositoryError;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Extract a readable message from a Diesel error and emit debug context.
pub fn map_diesel_error_message(error: &DieselError, operation: &str) -> String {
    let error_message = error.to_string();
    debug!(%error_message, %operation, "diesel operation failed");
    error_message
}

/// Map pool errors to venue store errors.
///
/// Checkout failures are connection failures, so the ingestion service may
/// retry them.
pub fn map_pool_error(error: PoolError) -> VenueRepositoryError {
    VenueRepositoryError::connection(map_pool_error_message(error))
}

/// Map Diesel errors to venue store errors for the named operation.
pub fn map_diesel_error(error: DieselError, operation: &str) -> VenueRepositoryError {
    let message = map_diesel_error_message(&error, operation);
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => VenueRepositoryError::connection(message),
        _ => VenueRepositoryError::query(message),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::checkout(PoolError::checkout("timed out"))]
    #[case::build(PoolError::build("bad url"))]
    fn pool_errors_are_connection_failures(#[case] error: PoolError) {
        let mapped = map_pool_error(error);
        assert!(mapped.is_transient());
    }

    #[rstest]
    fn missing_rows_are_query_failures() {
        let mapped = map_diesel_error(DieselError::NotFound, "venue lookup");
        assert!(matches!(mapped, VenueRepositoryError::Query { .. }));
        assert!(!mapped.is_transient());
    }

    #[rstest]
    fn broken_transaction_manager_is_retryable() {
        let mapped = map_diesel_error(DieselError::BrokenTransactionManager, "venue upsert");
        assert!(mapped.is_transient());
    }
}
