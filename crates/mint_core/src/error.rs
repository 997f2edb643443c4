use thiserror::Error;
use uuid::Uuid;

/// Every failure the core can hand back to a boundary layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Withdrawal request not found: {0}")]
    WithdrawalNotFound(Uuid),

    #[error("User already registered: {0}")]
    UserExists(String),

    #[error("Insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: i64, required: i64 },

    #[error("Withdrawal of {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: i64, minimum: i64 },

    #[error("Withdrawal request {0} has already been resolved")]
    AlreadyResolved(Uuid),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Document pipeline error: {0}")]
    Pipeline(String),

    #[error("Transient storage error: {0}")]
    TransientStorage(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification callers branch on instead of matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InsufficientBalance,
    BelowMinimum,
    Conflict,
    Invalid,
    Transient,
    Internal,
}

impl ErrorKind {
    /// Stable, user-facing wording. Clients rely on these strings not changing.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Item not found.",
            ErrorKind::InsufficientBalance => "You don't have enough coins for this.",
            ErrorKind::BelowMinimum => "The amount is below the minimum withdrawal.",
            ErrorKind::Conflict => "This request conflicts with the current state.",
            ErrorKind::Invalid => "The request is invalid.",
            ErrorKind::Transient => "Something went wrong, please try again.",
            ErrorKind::Internal => "Internal error.",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DocumentNotFound(_) | Error::UserNotFound(_) | Error::WithdrawalNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Error::BelowMinimum { .. } => ErrorKind::BelowMinimum,
            Error::UserExists(_) | Error::AlreadyResolved(_) => ErrorKind::Conflict,
            Error::InvalidAmount(_) | Error::InvalidInput(_) | Error::UnsupportedFormat(_) => {
                ErrorKind::Invalid
            }
            Error::TransientStorage(_) => ErrorKind::Transient,
            Error::Pipeline(_) | Error::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Only transient storage failures may be retried; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransientStorage(_))
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Pipeline(e.to_string())
    }
}
