use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("mapping error: {0}")]
    MappingError(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for domain::errors::DomainError {
    fn from(err: DbError) -> Self {
        use domain::errors::DomainError;
        match err {
            DbError::NotFound(msg) => DomainError::NotFound(msg),
            DbError::DuplicateEntry(msg) => DomainError::DuplicateEntry(msg),
            DbError::Precondition(msg) => DomainError::Precondition(msg),
            DbError::Database(e) => {
                if matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
                    DomainError::Transient(format!("database connectivity: {}", e))
                } else {
                    DomainError::Internal(format!("database error: {}", e))
                }
            }
            DbError::MappingError(msg) => DomainError::Internal(format!("mapping error: {}", msg)),
        }
    }
}
