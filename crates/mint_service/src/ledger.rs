use tracing::info;
use uuid::Uuid;

use mint_core::models::{normalize_identity, LedgerEntry, LedgerKind, User};
use mint_core::{Error, Result};

use crate::retry::{bounded, retrying};
use crate::MintService;

impl MintService {
    /// Opens an account and credits the signup bonus through the ledger.
    pub async fn register_user(&self, identity: &str) -> Result<User> {
        let identity = normalize_identity(identity)?;
        let user = bounded(&self.policy, self.ledger.create_user(&identity, self.policy.signup_bonus)).await?;
        info!(identity = %user.identity, bonus = self.policy.signup_bonus, "Registered user");
        Ok(user)
    }

    pub async fn get_user(&self, identity: &str) -> Result<User> {
        let identity = normalize_identity(identity)?;
        retrying(&self.policy, "user lookup", || self.ledger.get_user(&identity))
            .await?
            .ok_or(Error::UserNotFound(identity))
    }

    pub async fn get_balance(&self, identity: &str) -> Result<i64> {
        Ok(self.get_user(identity).await?.balance)
    }

    /// Entries in insertion order.
    pub async fn get_ledger_history(&self, identity: &str) -> Result<Vec<LedgerEntry>> {
        let user = self.get_user(identity).await?;
        retrying(&self.policy, "ledger history", || self.ledger.history(&user.identity)).await
    }

    // Adjustments are not idempotent: a timed-out call may still have
    // committed, so they are bounded but never retried.

    pub async fn credit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let identity = normalize_identity(identity)?;
        let entry = bounded(&self.policy, self.ledger.credit(&identity, amount, kind, document_id)).await?;
        info!(%identity, amount, %kind, "Credited");
        Ok(entry)
    }

    pub async fn debit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let identity = normalize_identity(identity)?;
        let entry = bounded(&self.policy, self.ledger.debit(&identity, amount, kind, document_id)).await?;
        info!(%identity, amount, %kind, "Debited");
        Ok(entry)
    }
}
