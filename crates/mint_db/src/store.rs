use async_trait::async_trait;
use uuid::Uuid;

use mint_core::models::{
    Decision, Document, DownloadReceipt, Grant, LedgerEntry, LedgerKind, NewDocument, User,
    WithdrawRequest, WithdrawStatus,
};
use mint_core::Result;

/// Catalog of uploaded documents. Entries are immutable once created.
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    async fn create_document(&self, doc: NewDocument) -> Result<Document>;

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;

    /// Newest uploads first.
    async fn list_documents(&self) -> Result<Vec<Document>>;
}

/// Balances, the append-only ledger, download receipts and withdrawals.
///
/// Every method is one atomic unit: implementations must serialize all
/// balance mutations for an identity and commit each method's writes
/// together or not at all. Identities are expected to be normalized already.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates the account at zero and credits `bonus` as a `SignupBonus`
    /// entry in the same unit, so history and balance agree from the start.
    async fn create_user(&self, identity: &str, bonus: i64) -> Result<User>;

    async fn get_user(&self, identity: &str) -> Result<Option<User>>;

    /// Appends `+amount` and raises the balance.
    async fn credit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry>;

    /// Appends `-amount` and lowers the balance, or fails with
    /// `InsufficientBalance` leaving everything untouched.
    async fn debit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry>;

    /// Entries in insertion order.
    async fn history(&self, identity: &str) -> Result<Vec<LedgerEntry>>;

    async fn find_receipt(&self, identity: &str, document_id: Uuid) -> Result<Option<DownloadReceipt>>;

    /// Newest purchases first.
    async fn list_receipts(&self, identity: &str) -> Result<Vec<DownloadReceipt>>;

    /// The entitlement unit: replay an existing receipt for free, otherwise
    /// check the balance, debit `cost`, write the receipt and the `Download`
    /// entry together.
    async fn purchase(&self, identity: &str, document_id: Uuid, file_name: &str, cost: i64) -> Result<Grant>;

    /// Debits `amount` as `Redeem` and records a pending request in one unit.
    async fn open_withdrawal(&self, identity: &str, amount: i64, payout_address: &str) -> Result<WithdrawRequest>;

    /// Moves a pending request to its final status. Rejection refunds the
    /// stored amount as `RedeemRefund` in the same unit.
    async fn resolve_withdrawal(&self, id: Uuid, decision: Decision) -> Result<WithdrawRequest>;

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<WithdrawRequest>>;

    /// Oldest first, optionally filtered by status.
    async fn list_withdrawals(&self, status: Option<WithdrawStatus>) -> Result<Vec<WithdrawRequest>>;
}
