use tracing::info;
use uuid::Uuid;

use mint_core::models::{normalize_identity, Decision, WithdrawRequest, WithdrawStatus};
use mint_core::{Error, Result};

use crate::retry::{bounded, retrying};
use crate::MintService;

impl MintService {
    /// Holds `amount` immediately and queues the request for an admin.
    pub async fn request_withdrawal(
        &self,
        identity: &str,
        amount: i64,
        payout_address: &str,
    ) -> Result<WithdrawRequest> {
        let identity = normalize_identity(identity)?;
        if amount < self.policy.min_withdrawal {
            return Err(Error::BelowMinimum { amount, minimum: self.policy.min_withdrawal });
        }
        let payout_address = payout_address.trim();
        if payout_address.is_empty() {
            return Err(Error::InvalidInput("payout address must not be empty".into()));
        }

        let request = bounded(
            &self.policy,
            self.ledger.open_withdrawal(&identity, amount, payout_address),
        )
        .await?;

        info!(%identity, amount, request_id = %request.id, "Withdrawal requested");
        Ok(request)
    }

    /// Approval keeps the hold; rejection refunds the stored amount.
    pub async fn resolve_withdrawal(&self, id: Uuid, decision: Decision) -> Result<WithdrawRequest> {
        let request = bounded(&self.policy, self.ledger.resolve_withdrawal(id, decision)).await?;
        info!(request_id = %id, status = %request.status, amount = request.amount, "Withdrawal resolved");
        Ok(request)
    }

    pub async fn get_withdrawal(&self, id: Uuid) -> Result<WithdrawRequest> {
        retrying(&self.policy, "withdrawal lookup", || self.ledger.get_withdrawal(id))
            .await?
            .ok_or(Error::WithdrawalNotFound(id))
    }

    /// Admin queue, oldest first.
    pub async fn list_withdrawals(&self, status: Option<WithdrawStatus>) -> Result<Vec<WithdrawRequest>> {
        retrying(&self.policy, "withdrawal list", || self.ledger.list_withdrawals(status)).await
    }
}
