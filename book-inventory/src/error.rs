use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::PoolError;

/// Errors surfaced by the persistence layer.
///
/// Constraint violations are passed through as [`StoreError::Query`] with the
/// storage engine's own error; the `is_*` helpers classify them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Query(#[from] DieselError),

    #[error("connection pool error: {0}")]
    Pool(#[from] bb8::RunError<PoolError>),

    #[error("connection manager error: {0}")]
    Manager(#[from] PoolError),

    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("migration task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn database_error_kind(&self) -> Option<&DatabaseErrorKind> {
        match self {
            StoreError::Query(DieselError::DatabaseError(kind, _)) => Some(kind),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self.database_error_kind(), Some(DatabaseErrorKind::UniqueViolation))
    }

    pub fn is_check_violation(&self) -> bool {
        matches!(self.database_error_kind(), Some(DatabaseErrorKind::CheckViolation))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(DatabaseErrorKind::ForeignKeyViolation)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Query(DieselError::NotFound))
    }
}
