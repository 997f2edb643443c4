use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use mint_core::models::{
    Decision, Document, DownloadReceipt, Grant, LedgerEntry, LedgerKind, NewDocument, User,
    WithdrawRequest, WithdrawStatus,
};
use mint_core::{Error, Result};

use crate::error::{db_error, sql_state, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use crate::rows::{DocumentRow, LedgerRow, ReceiptRow, UserRow, WithdrawRow};
use crate::store::{DocumentRegistry, LedgerStore};

const LEDGER_COLUMNS: &str = "seq, identity, kind, amount, document_id, created_at";
const DOCUMENT_COLUMNS: &str = "id, display_name, blob_key, original_file_name, content_type, \
     byte_size, uploaded_at, uploader_kind, category, section, tags";
const RECEIPT_COLUMNS: &str = "identity, document_id, file_name, coins_deducted, created_at";
const WITHDRAW_COLUMNS: &str = "id, identity, amount, payout_address, status, created_at, resolved_at";

/// Postgres-backed ledger and registry.
///
/// Each atomic unit is one SQL transaction that starts by locking the
/// account row (`SELECT ... FOR UPDATE`). Concurrent units for the same
/// identity therefore queue behind each other, and the later one re-reads
/// receipts and balances only after the earlier one committed.
#[derive(Clone)]
pub struct MintRepository {
    pool: PgPool,
}

impl MintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Locks the account row and returns its balance.
async fn lock_balance(conn: &mut PgConnection, identity: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT balance FROM users WHERE identity = $1 FOR UPDATE")
        .bind(identity)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?
        .ok_or_else(|| Error::UserNotFound(identity.to_string()))
}

/// Applies a signed change to a locked account and appends the entry.
/// Must run inside a transaction that already holds the row lock.
async fn apply_entry(
    conn: &mut PgConnection,
    identity: &str,
    balance: i64,
    delta: i64,
    kind: LedgerKind,
    document_id: Option<Uuid>,
) -> Result<LedgerEntry> {
    let next = balance.checked_add(delta).ok_or(Error::InvalidAmount(delta))?;
    if next < 0 {
        return Err(Error::InsufficientBalance { balance, required: -delta });
    }

    sqlx::query("UPDATE users SET balance = balance + $2 WHERE identity = $1")
        .bind(identity)
        .bind(delta)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;

    let row = sqlx::query_as::<_, LedgerRow>(&format!(
        "INSERT INTO ledger_entries (identity, kind, amount, document_id) \
         VALUES ($1, $2, $3, $4) RETURNING {LEDGER_COLUMNS}"
    ))
    .bind(identity)
    .bind(kind.as_str())
    .bind(delta)
    .bind(document_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)?;

    row.try_into()
}

fn positive(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(amount)
}

#[async_trait]
impl DocumentRegistry for MintRepository {
    async fn create_document(&self, doc: NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO documents \
             (id, display_name, blob_key, original_file_name, content_type, byte_size, uploader_kind, category, section, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&doc.display_name)
        .bind(&doc.blob_key)
        .bind(&doc.original_file_name)
        .bind(&doc.content_type)
        .bind(doc.byte_size)
        .bind(doc.uploader_kind.as_str())
        .bind(&doc.category)
        .bind(&doc.section)
        .bind(&doc.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        info!(document_id = %row.id, blob_key = %row.blob_key, "Registered document");
        row.try_into()
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        sqlx::query_as::<_, DocumentRow>(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Document::try_from)
            .transpose()
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY uploaded_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(Document::try_from)
        .collect()
    }
}

#[async_trait]
impl LedgerStore for MintRepository {
    async fn create_user(&self, identity: &str, bonus: i64) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let mut user: User = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (identity, balance) VALUES ($1, 0) RETURNING identity, balance, created_at",
        )
        .bind(identity)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => Error::UserExists(identity.to_string()),
            _ => db_error(e),
        })?
        .into();

        if bonus > 0 {
            apply_entry(&mut tx, identity, 0, bonus, LedgerKind::SignupBonus, None).await?;
            user.balance = bonus;
        }

        tx.commit().await.map_err(db_error)?;
        info!(identity, bonus, "Registered user");
        Ok(user)
    }

    async fn get_user(&self, identity: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT identity, balance, created_at FROM users WHERE identity = $1",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(User::from))
    }

    async fn credit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let amount = positive(amount)?;
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let balance = lock_balance(&mut tx, identity).await?;
        let entry = apply_entry(&mut tx, identity, balance, amount, kind, document_id).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(entry)
    }

    async fn debit(
        &self,
        identity: &str,
        amount: i64,
        kind: LedgerKind,
        document_id: Option<Uuid>,
    ) -> Result<LedgerEntry> {
        let amount = positive(amount)?;
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let balance = lock_balance(&mut tx, identity).await?;
        // An Err here drops `tx`, rolling back the lock without writes.
        let entry = apply_entry(&mut tx, identity, balance, -amount, kind, document_id).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(entry)
    }

    async fn history(&self, identity: &str) -> Result<Vec<LedgerEntry>> {
        sqlx::query_as::<_, LedgerRow>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE identity = $1 ORDER BY seq"
        ))
        .bind(identity)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(LedgerEntry::try_from)
        .collect()
    }

    async fn find_receipt(&self, identity: &str, document_id: Uuid) -> Result<Option<DownloadReceipt>> {
        let row = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM download_receipts WHERE identity = $1 AND document_id = $2"
        ))
        .bind(identity)
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(DownloadReceipt::from))
    }

    async fn list_receipts(&self, identity: &str) -> Result<Vec<DownloadReceipt>> {
        let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM download_receipts WHERE identity = $1 ORDER BY created_at DESC"
        ))
        .bind(identity)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(DownloadReceipt::from).collect())
    }

    async fn purchase(&self, identity: &str, document_id: Uuid, file_name: &str, cost: i64) -> Result<Grant> {
        if cost < 0 {
            return Err(Error::InvalidAmount(cost));
        }

        // 1. START THE TRANSACTION
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // 2. Serialize against every other balance change for this identity
        let balance = lock_balance(&mut tx, identity).await?;

        // 3. Replay: the receipt was committed by an earlier (or racing) request
        let existing = sqlx::query_as::<_, ReceiptRow>(&format!(
            "SELECT {RECEIPT_COLUMNS} FROM download_receipts WHERE identity = $1 AND document_id = $2"
        ))
        .bind(identity)
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        if let Some(row) = existing {
            tx.rollback().await.map_err(db_error)?;
            debug!(identity, %document_id, "Replaying existing receipt");
            return Ok(Grant { receipt: row.into(), replayed: true });
        }

        // 4. Charge, receipt and history commit together
        if cost > 0 {
            apply_entry(&mut tx, identity, balance, -cost, LedgerKind::Download, Some(document_id)).await?;
        }

        let receipt = sqlx::query_as::<_, ReceiptRow>(&format!(
            "INSERT INTO download_receipts (identity, document_id, file_name, coins_deducted) \
             VALUES ($1, $2, $3, $4) RETURNING {RECEIPT_COLUMNS}"
        ))
        .bind(identity)
        .bind(document_id)
        .bind(file_name)
        .bind(cost)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match sql_state(&e).as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => Error::DocumentNotFound(document_id),
            _ => db_error(e),
        })?;

        tx.commit().await.map_err(db_error)?;
        info!(identity, %document_id, cost, "Granted download");

        Ok(Grant { receipt: receipt.into(), replayed: false })
    }

    async fn open_withdrawal(&self, identity: &str, amount: i64, payout_address: &str) -> Result<WithdrawRequest> {
        let amount = positive(amount)?;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let balance = lock_balance(&mut tx, identity).await?;
        apply_entry(&mut tx, identity, balance, -amount, LedgerKind::Redeem, None).await?;

        let row = sqlx::query_as::<_, WithdrawRow>(&format!(
            "INSERT INTO withdraw_requests (id, identity, amount, payout_address, status) \
             VALUES ($1, $2, $3, $4, 'pending') RETURNING {WITHDRAW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(identity)
        .bind(amount)
        .bind(payout_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        info!(identity, amount, request_id = %row.id, "Opened withdrawal");
        row.try_into()
    }

    async fn resolve_withdrawal(&self, id: Uuid, decision: Decision) -> Result<WithdrawRequest> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // 1. Lock the request so two admins cannot both resolve it
        let pending: WithdrawRequest = sqlx::query_as::<_, WithdrawRow>(&format!(
            "SELECT {WITHDRAW_COLUMNS} FROM withdraw_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?
        .ok_or(Error::WithdrawalNotFound(id))?
        .try_into()?;

        if pending.status != WithdrawStatus::Pending {
            return Err(Error::AlreadyResolved(id));
        }

        // 2. Refund the amount that was held, never a recomputed one
        if decision == Decision::Reject {
            let balance = lock_balance(&mut tx, &pending.identity).await?;
            apply_entry(&mut tx, &pending.identity, balance, pending.amount, LedgerKind::RedeemRefund, None)
                .await?;
        }

        // 3. One-way status transition
        let row = sqlx::query_as::<_, WithdrawRow>(&format!(
            "UPDATE withdraw_requests SET status = $2, resolved_at = now() \
             WHERE id = $1 AND status = 'pending' RETURNING {WITHDRAW_COLUMNS}"
        ))
        .bind(id)
        .bind(decision.target_status().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        info!(request_id = %id, status = %row.status, "Resolved withdrawal");
        row.try_into()
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<Option<WithdrawRequest>> {
        sqlx::query_as::<_, WithdrawRow>(&format!(
            "SELECT {WITHDRAW_COLUMNS} FROM withdraw_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(WithdrawRequest::try_from)
        .transpose()
    }

    async fn list_withdrawals(&self, status: Option<WithdrawStatus>) -> Result<Vec<WithdrawRequest>> {
        sqlx::query_as::<_, WithdrawRow>(&format!(
            "SELECT {WITHDRAW_COLUMNS} FROM withdraw_requests \
             WHERE $1::TEXT IS NULL OR status = $1 ORDER BY created_at, id"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(WithdrawRequest::try_from)
        .collect()
    }
}
