use thiserror::Error;

/// Error kinds surfaced by the Draft Store and consumed by the Orchestrator.
///
/// `Conflict` is not a failure in the usual sense: `ClaimNextSlot` returning
/// empty and `MakePick` affecting zero rows both mean "lost the race", which
/// callers are expected to handle as a benign no-op rather than propagate.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("transient I/O error: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the Orchestrator should nak (redeliver) a message that
    /// failed with this error, versus log-and-ack because the error is not
    /// actionable by retrying (spec §7: validation/precondition/not-found
    /// are surfaced, not retried; transient I/O is).
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Transient(_) | DomainError::Internal(_))
    }
}
