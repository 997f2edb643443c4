use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use mint_core::models::{Document, DownloadReceipt, LedgerEntry, User, WithdrawRequest};
use mint_core::Error;

// Row shapes as stored; enums travel as TEXT and are parsed on the way out.

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub identity: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User { identity: row.identity, balance: row.balance, created_at: row.created_at }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct LedgerRow {
    pub seq: i64,
    pub identity: String,
    pub kind: String,
    pub amount: i64,
    pub document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = Error;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(LedgerEntry {
            seq: row.seq,
            identity: row.identity,
            kind: row.kind.parse()?,
            amount: row.amount,
            created_at: row.created_at,
            document_id: row.document_id,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub display_name: String,
    pub blob_key: String,
    pub original_file_name: String,
    pub content_type: String,
    pub byte_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub uploader_kind: String,
    pub category: Option<String>,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            display_name: row.display_name,
            blob_key: row.blob_key,
            original_file_name: row.original_file_name,
            content_type: row.content_type,
            byte_size: row.byte_size,
            uploaded_at: row.uploaded_at,
            uploader_kind: row.uploader_kind.parse().map_err(|e: Error| Error::Storage(e.to_string()))?,
            category: row.category,
            section: row.section,
            tags: row.tags,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ReceiptRow {
    pub identity: String,
    pub document_id: Uuid,
    pub file_name: String,
    pub coins_deducted: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ReceiptRow> for DownloadReceipt {
    fn from(row: ReceiptRow) -> Self {
        DownloadReceipt {
            identity: row.identity,
            document_id: row.document_id,
            file_name: row.file_name,
            coins_deducted: row.coins_deducted,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct WithdrawRow {
    pub id: Uuid,
    pub identity: String,
    pub amount: i64,
    pub payout_address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<WithdrawRow> for WithdrawRequest {
    type Error = Error;

    fn try_from(row: WithdrawRow) -> Result<Self, Self::Error> {
        Ok(WithdrawRequest {
            id: row.id,
            identity: row.identity,
            amount: row.amount,
            payout_address: row.payout_address,
            status: row.status.parse().map_err(|e: Error| Error::Storage(e.to_string()))?,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}
