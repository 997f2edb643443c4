use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// The Account: User
// Balance is owned by the ledger and only ever changes through ledger entries.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub identity: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

/// Identities are compared case-insensitively; every entry point stores the
/// trimmed, lowercased form.
pub fn normalize_identity(raw: &str) -> Result<String> {
    let identity = raw.trim().to_lowercase();
    if identity.is_empty() {
        return Err(Error::InvalidInput("identity must not be empty".into()));
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_trimmed_and_lowercased() {
        assert_eq!(normalize_identity("  Reader@Example.COM ").unwrap(), "reader@example.com");
    }

    #[test]
    fn blank_identity_is_rejected() {
        assert!(matches!(normalize_identity("   "), Err(Error::InvalidInput(_))));
    }
}
