//! Ownership-movement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carbonledger_types::{AccountId, CreditId};

/// One ownership movement. Appended by [`crate::CreditRegistry::transfer`];
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub credit_id: CreditId,
    pub from: AccountId,
    pub to: AccountId,
    pub transferred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_record_serde_roundtrip() {
        let rec = TransferRecord {
            credit_id: CreditId(1),
            from: AccountId::new(),
            to: AccountId::new(),
            transferred_at: Utc::now(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        let back: TransferRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
