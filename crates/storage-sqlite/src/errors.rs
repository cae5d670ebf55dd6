//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic errors of `fundwatch_core` before leaving the crate.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use fundwatch_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    /// A stored column could not be mapped back to its domain type.
    #[error("Invalid stored value: {0}")]
    InvalidStoredValue(String),

    #[error("Core error: {0}")]
    CoreError(String),
}

/// Lets a job closure that returns core errors run inside a Diesel transaction.
impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::CoreError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db_error = match err {
            StorageError::ConnectionFailed(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::PoolError(e) => DatabaseError::PoolCreationFailed(e.to_string()),
            StorageError::QueryFailed(DieselError::NotFound) => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => DatabaseError::UniqueViolation(info.message().to_string()),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => DatabaseError::ForeignKeyViolation(info.message().to_string()),
            StorageError::QueryFailed(DieselError::RollbackTransaction)
            | StorageError::QueryFailed(DieselError::RollbackErrorOnCommit { .. }) => {
                DatabaseError::TransactionFailed("Transaction was rolled back".to_string())
            }
            StorageError::QueryFailed(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::InvalidStoredValue(e) => DatabaseError::Internal(e),
            StorageError::CoreError(e) => DatabaseError::Internal(e),
        };
        Error::Database(db_error)
    }
}

/// Adds `.into_core()` to Diesel and r2d2 results.
///
/// The orphan rule forbids `From<diesel::result::Error> for fundwatch_core::Error`,
/// so the conversion goes through [`StorageError`].
pub trait IntoCore<T> {
    fn into_core(self) -> fundwatch_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> fundwatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> fundwatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
