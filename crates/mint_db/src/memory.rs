//! In-process store for tests and local runs.
//!
//! One mutex guards all state, so each trait method is trivially atomic and
//! isolated. Nothing survives a restart; production uses [`crate::MintRepository`].

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use mint_core::models::{
    Decision, Document, DownloadReceipt, Grant, LedgerEntry, LedgerKind, NewDocument, User,
    WithdrawRequest, WithdrawStatus,
};
use mint_core::{Error, Result};

use crate::store::{DocumentRegistry, LedgerStore};

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    entries: Vec<LedgerEntry>,
    documents: Vec<Document>,
    receipts: HashMap<(String, Uuid), DownloadReceipt>,
    withdrawals: Vec<WithdrawRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    /// Applies a signed balance change and appends the matching entry.
    fn apply(
        &mut self,
        identity: &str,
        delta: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let user = self
            .users
            .get_mut(identity)
            .ok_or_else(|| Error::UserNotFound(identity.to_string()))?;
        let next = user.balance.checked_add(delta).ok_or(Error::InvalidAmount(delta))?;
        if next < 0 {
            return Err(Error::InsufficientBalance { balance: user.balance, required: -delta });
        }
        user.balance = next;

        let entry = LedgerEntry {
            seq: self.entries.len() as i64 + 1,
            identity: identity.to_string(),
            kind,
            amount: delta,
            created_at: Utc::now(),
            document_id,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

fn positive(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(amount)
}

#[async_trait]
impl DocumentRegistry for MemoryStore {
    async fn create_document(&self, doc: NewDocument) -> Result<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            display_name: doc.display_name,
            blob_key: doc.blob_key,
            original_file_name: doc.original_file_name,
            content_type: doc.content_type,
            byte_size: doc.byte_size,
            uploaded_at: Utc::now(),
            uploader_kind: doc.uploader_kind,
            category: doc.category,
            section: doc.section,
            tags: doc.tags,
        };
        self.state.lock().await.documents.push(document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let state = self.state.lock().await;
        Ok(state.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let state = self.state.lock().await;
        Ok(state.documents.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn create_user(&self, identity: &str, bonus: i64) -> Result<User> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(identity) {
            return Err(Error::UserExists(identity.to_string()));
        }
        state.users.insert(
            identity.to_string(),
            User { identity: identity.to_string(), balance: 0, created_at: Utc::now() },
        );
        if bonus > 0 {
            state.apply(identity, bonus, LedgerKind::SignupBonus, None)?;
        }
        Ok(state.users[identity].clone())
    }

    async fn get_user(&self, identity: &str) -> Result<Option<User>> {
        Ok(self.state.lock().await.users.get(identity).cloned())
    }

    async fn credit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let amount = positive(amount)?;
        self.state.lock().await.apply(identity, amount, kind, document_id)
    }

    async fn debit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let amount = positive(amount)?;
        self.state.lock().await.apply(identity, -amount, kind, document_id)
    }

    async fn history(&self, identity: &str) -> Result<Vec<LedgerEntry>> {
        let state = self.state.lock().await;
        Ok(state.entries.iter().filter(|e| e.identity == identity).cloned().collect())
    }

    async fn find_receipt(&self, identity: &str, document_id: Uuid) -> Result<Option<DownloadReceipt>> {
        let state = self.state.lock().await;
        Ok(state.receipts.get(&(identity.to_string(), document_id)).cloned())
    }

    async fn list_receipts(&self, identity: &str) -> Result<Vec<DownloadReceipt>> {
        let state = self.state.lock().await;
        let mut receipts: Vec<_> = state
            .receipts
            .values()
            .filter(|r| r.identity == identity)
            .cloned()
            .collect();
        receipts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(receipts)
    }

    async fn purchase(&self, identity: &str, document_id: Uuid, file_name: &str, cost: i64) -> Result<Grant> {
        if cost < 0 {
            return Err(Error::InvalidAmount(cost));
        }
        let mut state = self.state.lock().await;
        if !state.users.contains_key(identity) {
            return Err(Error::UserNotFound(identity.to_string()));
        }

        let key = (identity.to_string(), document_id);
        if let Some(receipt) = state.receipts.get(&key) {
            return Ok(Grant { receipt: receipt.clone(), replayed: true });
        }
        if !state.documents.iter().any(|d| d.id == document_id) {
            return Err(Error::DocumentNotFound(document_id));
        }

        if cost > 0 {
            state.apply(identity, -cost, LedgerKind::Download, Some(document_id))?;
        }
        let receipt = DownloadReceipt {
            identity: identity.to_string(),
            document_id,
            file_name: file_name.to_string(),
            coins_deducted: cost,
            created_at: Utc::now(),
        };
        state.receipts.insert(key, receipt.clone());
        Ok(Grant { receipt, replayed: false })
    }

    async fn open_withdrawal(&self, identity: &str, amount: i64, payout_address: &str) -> Result<WithdrawRequest> {
        let amount = positive(amount)?;
        let mut state = self.state.lock().await;
        state.apply(identity, -amount, LedgerKind::Redeem, None)?;

        let request = WithdrawRequest {
            id: Uuid::new_v4(),
            identity: identity.to_string(),
            amount,
            payout_address: payout_address.to_string(),
            status: WithdrawStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };
        state.withdrawals.push(request.clone());
        Ok(request)
    }

    async fn resolve_withdrawal(&self, id: Uuid, decision: Decision) -> Result<WithdrawRequest> {
        let mut state = self.state.lock().await;
        let index = state
            .withdrawals
            .iter()
            .position(|w| w.id == id)
            .ok_or(Error::WithdrawalNotFound(id))?;

        let pending = &state.withdrawals[index];
        if pending.status != WithdrawStatus::Pending {
            return Err(Error::AlreadyResolved(id));
        }
        let (identity, amount) = (pending.identity.clone(), pending.amount);

        if decision == Decision::Reject {
            state.apply(&identity, amount, LedgerKind::RedeemRefund, None)?;
        }
        let request = &mut state.withdrawals[index];
        request.status = decision.target_status();
        request.resolved_at = Some(Utc::now());
        Ok(request.clone())
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<WithdrawRequest>> {
        let state = self.state.lock().await;
        Ok(state.withdrawals.iter().find(|w| w.id == id).cloned())
    }

    async fn list_withdrawals(&self, status: Option<WithdrawStatus>) -> Result<Vec<WithdrawRequest>> {
        let state = self.state.lock().await;
        Ok(state
            .withdrawals
            .iter()
            .filter(|w| status.map_or(true, |s| w.status == s))
            .cloned()
            .collect())
    }
}
