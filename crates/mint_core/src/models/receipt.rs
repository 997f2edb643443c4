use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// The Proof: Download Receipt
// At most one per (identity, document_id). Never updated.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReceipt {
    pub identity: String,
    pub document_id: Uuid,
    pub file_name: String,
    pub coins_deducted: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of an entitlement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub receipt: DownloadReceipt,
    /// True when the receipt already existed and nothing was charged.
    pub replayed: bool,
}
