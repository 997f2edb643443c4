pub mod document;
pub mod ledger;
pub mod receipt;
pub mod user;
pub mod withdrawal;

pub use document::{Document, NewDocument, UploaderKind};
pub use ledger::{LedgerEntry, LedgerKind};
pub use receipt::{DownloadReceipt, Grant};
pub use user::{normalize_identity, User};
pub use withdrawal::{Decision, WithdrawRequest, WithdrawStatus};
