//! Error types for the queue engine
//!
//! Every engine operation returns one of these result codes; nothing in the
//! core panics or throws across the persistence boundary. Admission-control
//! codes are produced in the documented precondition order, so the first
//! violated rule is the one a caller sees.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, QueueError>;

/// Opaque failure from the persistence adapter.
///
/// Storage implementations fail closed: any transport or storage problem
/// becomes a `StoreError` value, never a panic across the boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("storage failure: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result codes for queue engine operations
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("leader not found: {leader_id}")]
    NotFound { leader_id: String },

    #[error("challenger not found: {challenger_id}")]
    ChallengerNotFound { challenger_id: String },

    #[error("queue is closed")]
    QueueClosed,

    #[error("queue is full")]
    QueueFull,

    #[error("leader does not battle at the requested difficulty")]
    UnsupportedDifficulty,

    #[error("leader does not battle in the requested format")]
    UnsupportedFormat,

    #[error("not enough badges: {have} of {need}")]
    NotEnoughBadges { have: u32, need: u32 },

    #[error("not enough emblems: {have} of {need}")]
    NotEnoughEmblems { have: u32, need: u32 },

    #[error("challenger is already in this queue")]
    AlreadyInQueue,

    #[error("challenger has already earned this badge")]
    AlreadyWon,

    #[error("challenger is in too many queues")]
    TooManyChallenges,

    #[error("challenger is not in this queue")]
    NotInQueue,

    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("board size mismatch: expected {expected} cells, found {found}")]
    BoardSizeMismatch { expected: usize, found: usize },

    #[error(transparent)]
    StorageFailure(#[from] StoreError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl QueueError {
    /// Internal error for a poisoned lock
    pub(crate) fn lock(what: &str) -> Self {
        QueueError::Internal {
            message: format!("failed to acquire {} lock", what),
        }
    }
}
