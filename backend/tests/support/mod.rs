//! Shared helper utilities for venue integration tests.
//!
//! Each file under `backend/tests/` compiles as its own crate, so common
//! helpers live here and are pulled in with `mod support;`.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;

/// Render a `postgres` error with its SQLSTATE and server message.
///
/// `postgres::Error`'s `Display` often collapses to `db error`, which hides
/// what actually failed.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => {
            let mut summary = format!(
                "postgres error {:?}: {}",
                db_error.code(),
                db_error.message()
            );
            if let Some(detail) = db_error.detail() {
                summary.push_str("; detail: ");
                summary.push_str(detail);
            }
            summary
        }
        None => error.to_string(),
    }
}
