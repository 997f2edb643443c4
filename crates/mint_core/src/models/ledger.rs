use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

// ---------------------------------------------------------------------------
// The History: Ledger Entry
// Append-only. The sum of a user's entries always equals their balance.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Insertion order within the whole ledger.
    pub seq: i64,
    pub identity: String,
    pub kind: LedgerKind,
    /// Signed: credits are positive, debits negative.
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub document_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    SignupBonus,
    Redeem,
    RedeemRefund,
    Download,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::SignupBonus => "signup_bonus",
            LedgerKind::Redeem => "redeem",
            LedgerKind::RedeemRefund => "redeem_refund",
            LedgerKind::Download => "download",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LedgerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup_bonus" => Ok(LedgerKind::SignupBonus),
            "redeem" => Ok(LedgerKind::Redeem),
            "redeem_refund" => Ok(LedgerKind::RedeemRefund),
            "download" => Ok(LedgerKind::Download),
            other => Err(Error::Storage(format!("unknown ledger kind '{}'", other))),
        }
    }
}
