pub mod error;
pub mod models;
pub mod pipeline;

pub use error::{Error, ErrorKind, Result};

/// Coins granted when an account is created.
pub const SIGNUP_BONUS: i64 = 50;

/// Coins charged for the first download of a document.
pub const DOWNLOAD_COST: i64 = 10;

/// Smallest amount a user may redeem.
pub const MIN_WITHDRAWAL: i64 = 20;
