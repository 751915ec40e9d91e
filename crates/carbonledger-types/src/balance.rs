//! Balance tracking types for the settlement ledger.
//!
//! Every participant has a `pending` balance (withdrawable: proceeds,
//! fees, refunds, change) and an `escrowed` balance (held against a live
//! auction bid). All amounts are integer minor units of the payment asset.

use serde::{Deserialize, Serialize};

/// A single balance entry for a (participant, asset) pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Withdrawable at any time.
    pub pending: u64,
    /// Held against the participant's live auction bid.
    pub escrowed: u64,
}

impl BalanceEntry {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: 0,
            escrowed: 0,
        }
    }

    /// Total held on the participant's behalf (pending + escrowed).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.pending + self.escrowed
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.pending == 0 && self.escrowed == 0
    }
}

/// Type alias for payment-asset identifiers (e.g., "USDC", "EURC").
pub type Asset = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_entry_default_is_zero() {
        let entry = BalanceEntry::default();
        assert_eq!(entry.pending, 0);
        assert_eq!(entry.escrowed, 0);
        assert!(entry.is_zero());
    }

    #[test]
    fn balance_entry_total() {
        let entry = BalanceEntry {
            pending: 100,
            escrowed: 50,
        };
        assert_eq!(entry.total(), 150);
        assert!(!entry.is_zero());
    }

    #[test]
    fn balance_entry_serde_roundtrip() {
        let entry = BalanceEntry {
            pending: 12_345,
            escrowed: 678,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: BalanceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
