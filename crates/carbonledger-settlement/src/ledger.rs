//! The settlement ledger: custody of marketplace funds.
//!
//! Tracks per-(participant, asset) balances with pending/escrowed
//! accounting. `pending` is withdrawable (sale proceeds, collected fees,
//! refunds, change); `escrowed` is held against a live auction bid. All
//! mutations are atomic: either the full operation succeeds or the ledger
//! is unchanged.
//!
//! Refunds are pull-payments: an outbid bidder's escrow moves to their
//! pending balance, never directly out of the system. This keeps every
//! fund movement an internal ledger mutation until an explicit withdraw.

use std::collections::HashMap;

use carbonledger_types::{AccountId, Asset, BalanceEntry, LedgerError, Result};

use crate::fees::{fee_split, FeeSplit};

/// Custodian of escrowed bids and withdrawable proceeds.
///
/// The marketplace is the only mutating caller; participants interact
/// through marketplace operations and `withdraw`.
pub struct SettlementLedger {
    /// Per-(participant, asset) balances.
    balances: HashMap<(AccountId, Asset), BalanceEntry>,
    /// Funds that ever entered custody, per asset.
    inflows: HashMap<Asset, u64>,
    /// Funds withdrawn out of custody, per asset.
    outflows: HashMap<Asset, u64>,
}

impl SettlementLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            inflows: HashMap::new(),
            outflows: HashMap::new(),
        }
    }

    // =====================================================================
    // Escrow lifecycle
    // =====================================================================

    /// Take a new bid into escrow. The tendered funds enter custody.
    pub fn escrow(&mut self, bidder: AccountId, asset: &str, amount: u64) {
        let entry = self
            .balances
            .entry((bidder, asset.to_string()))
            .or_default();
        entry.escrowed += amount;
        *self.inflows.entry(asset.to_string()).or_insert(0) += amount;

        tracing::debug!(bidder = %bidder, asset, amount, "Bid escrowed");
    }

    /// Release escrow back to the bidder's pending balance (outbid or
    /// failed auction).
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if less than `amount` is held.
    pub fn release_escrow(&mut self, bidder: AccountId, asset: &str, amount: u64) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&(bidder, asset.to_string()))
            .ok_or(LedgerError::InsufficientEscrow)?;
        if entry.escrowed < amount {
            return Err(LedgerError::InsufficientEscrow);
        }

        entry.escrowed -= amount;
        entry.pending += amount;

        tracing::debug!(bidder = %bidder, asset, amount, "Escrow released to pending");
        Ok(())
    }

    /// Consume the winning bidder's escrow and distribute it: the fee
    /// (floored) to `fee_recipient`, the remainder to `seller`.
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if less than `amount` is held.
    pub fn settle_escrow(
        &mut self,
        bidder: AccountId,
        seller: AccountId,
        fee_recipient: AccountId,
        asset: &str,
        amount: u64,
        fee_bps: u64,
    ) -> Result<FeeSplit> {
        {
            let entry = self
                .balances
                .get_mut(&(bidder, asset.to_string()))
                .ok_or(LedgerError::InsufficientEscrow)?;
            if entry.escrowed < amount {
                return Err(LedgerError::InsufficientEscrow);
            }
            entry.escrowed -= amount;
        }

        let split = fee_split(amount, fee_bps);
        self.balances
            .entry((seller, asset.to_string()))
            .or_default()
            .pending += split.proceeds;
        self.balances
            .entry((fee_recipient, asset.to_string()))
            .or_default()
            .pending += split.fee;

        tracing::info!(
            bidder = %bidder,
            seller = %seller,
            asset,
            amount,
            fee = split.fee,
            proceeds = split.proceeds,
            "Escrow settled"
        );

        Ok(split)
    }

    // =====================================================================
    // Direct settlement
    // =====================================================================

    /// Settle a fixed-price purchase: the buyer's tendered `total` enters
    /// custody and is immediately distributed — fee (floored) to
    /// `fee_recipient`, remainder to `seller`.
    pub fn settle_direct(
        &mut self,
        buyer: AccountId,
        seller: AccountId,
        fee_recipient: AccountId,
        asset: &str,
        total: u64,
        fee_bps: u64,
    ) -> FeeSplit {
        let split = fee_split(total, fee_bps);
        *self.inflows.entry(asset.to_string()).or_insert(0) += total;
        self.balances
            .entry((seller, asset.to_string()))
            .or_default()
            .pending += split.proceeds;
        self.balances
            .entry((fee_recipient, asset.to_string()))
            .or_default()
            .pending += split.fee;

        tracing::info!(
            buyer = %buyer,
            seller = %seller,
            asset,
            total,
            fee = split.fee,
            proceeds = split.proceeds,
            "Direct sale settled"
        );

        split
    }

    /// Credit a participant's pending balance with funds entering custody
    /// (overpayment change).
    pub fn credit_pending(&mut self, account: AccountId, asset: &str, amount: u64) {
        self.balances
            .entry((account, asset.to_string()))
            .or_default()
            .pending += amount;
        *self.inflows.entry(asset.to_string()).or_insert(0) += amount;
    }

    /// Withdraw from a pending balance, moving funds out of custody.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if pending < amount.
    pub fn withdraw(&mut self, account: AccountId, asset: &str, amount: u64) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&(account, asset.to_string()))
            .ok_or(LedgerError::InsufficientFunds {
                needed: amount,
                available: 0,
            })?;
        if entry.pending < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: entry.pending,
            });
        }

        entry.pending -= amount;
        *self.outflows.entry(asset.to_string()).or_insert(0) += amount;

        tracing::info!(account = %account, asset, amount, "Withdrawal");
        Ok(())
    }

    // =====================================================================
    // Queries & audit
    // =====================================================================

    /// Balance entry for a (participant, asset) pair.
    #[must_use]
    pub fn balance(&self, account: AccountId, asset: &str) -> BalanceEntry {
        self.balances
            .get(&(account, asset.to_string()))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn pending_of(&self, account: AccountId, asset: &str) -> u64 {
        self.balance(account, asset).pending
    }

    #[must_use]
    pub fn escrowed_of(&self, account: AccountId, asset: &str) -> u64 {
        self.balance(account, asset).escrowed
    }

    /// Everything currently in custody for an asset.
    #[must_use]
    pub fn total_held(&self, asset: &str) -> u64 {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, entry)| entry.total())
            .sum()
    }

    /// Fund conservation audit: everything in custody must equal inflows
    /// minus outflows.
    ///
    /// # Errors
    /// Returns [`LedgerError::FundConservationViolation`] on mismatch —
    /// a critical alert, since settlement only ever moves funds between
    /// participants.
    pub fn verify_funds(&self, asset: &str) -> Result<()> {
        let held = self.total_held(asset);
        let inflow = self.inflows.get(asset).copied().unwrap_or(0);
        let outflow = self.outflows.get(asset).copied().unwrap_or(0);
        let expected = inflow - outflow;
        if held != expected {
            return Err(LedgerError::FundConservationViolation {
                reason: format!(
                    "Asset {asset}: held {held} != expected {expected} \
                     (inflows={inflow}, outflows={outflow})"
                ),
            });
        }
        Ok(())
    }
}

impl Default for SettlementLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDC: &str = "USDC";

    #[test]
    fn escrow_holds_funds() {
        let mut ledger = SettlementLedger::new();
        let bidder = AccountId::new();
        ledger.escrow(bidder, USDC, 500);

        let bal = ledger.balance(bidder, USDC);
        assert_eq!(bal.escrowed, 500);
        assert_eq!(bal.pending, 0);
        ledger.verify_funds(USDC).unwrap();
    }

    #[test]
    fn release_moves_escrow_to_pending() {
        let mut ledger = SettlementLedger::new();
        let bidder = AccountId::new();
        ledger.escrow(bidder, USDC, 500);
        ledger.release_escrow(bidder, USDC, 500).unwrap();

        let bal = ledger.balance(bidder, USDC);
        assert_eq!(bal.escrowed, 0);
        assert_eq!(bal.pending, 500);
        ledger.verify_funds(USDC).unwrap();
    }

    #[test]
    fn release_more_than_held_fails() {
        let mut ledger = SettlementLedger::new();
        let bidder = AccountId::new();
        ledger.escrow(bidder, USDC, 100);
        let err = ledger.release_escrow(bidder, USDC, 200).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientEscrow));
        // Unchanged.
        assert_eq!(ledger.escrowed_of(bidder, USDC), 100);
    }

    #[test]
    fn settle_escrow_splits_fee() {
        let mut ledger = SettlementLedger::new();
        let bidder = AccountId::new();
        let seller = AccountId::new();
        let platform = AccountId::new();
        ledger.escrow(bidder, USDC, 700);

        let split = ledger
            .settle_escrow(bidder, seller, platform, USDC, 700, 250)
            .unwrap();
        assert_eq!(split.fee, 17);
        assert_eq!(split.proceeds, 683);

        assert_eq!(ledger.escrowed_of(bidder, USDC), 0);
        assert_eq!(ledger.pending_of(seller, USDC), 683);
        assert_eq!(ledger.pending_of(platform, USDC), 17);
        ledger.verify_funds(USDC).unwrap();
    }

    #[test]
    fn settle_without_escrow_fails() {
        let mut ledger = SettlementLedger::new();
        let err = ledger
            .settle_escrow(
                AccountId::new(),
                AccountId::new(),
                AccountId::new(),
                USDC,
                700,
                250,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientEscrow));
    }

    #[test]
    fn settle_direct_distributes_immediately() {
        let mut ledger = SettlementLedger::new();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        let platform = AccountId::new();

        let split = ledger.settle_direct(buyer, seller, platform, USDC, 700, 250);
        assert_eq!(split.fee, 17);
        assert_eq!(ledger.pending_of(seller, USDC), 683);
        assert_eq!(ledger.pending_of(platform, USDC), 17);
        assert_eq!(ledger.pending_of(buyer, USDC), 0);
        ledger.verify_funds(USDC).unwrap();
    }

    #[test]
    fn withdraw_leaves_custody() {
        let mut ledger = SettlementLedger::new();
        let account = AccountId::new();
        ledger.credit_pending(account, USDC, 1_000);
        ledger.withdraw(account, USDC, 400).unwrap();

        assert_eq!(ledger.pending_of(account, USDC), 600);
        ledger.verify_funds(USDC).unwrap();

        let err = ledger.withdraw(account, USDC, 601).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    }

    #[test]
    fn assets_are_independent() {
        let mut ledger = SettlementLedger::new();
        let account = AccountId::new();
        ledger.escrow(account, "USDC", 100);
        ledger.escrow(account, "EURC", 250);

        assert_eq!(ledger.total_held("USDC"), 100);
        assert_eq!(ledger.total_held("EURC"), 250);
        ledger.verify_funds("USDC").unwrap();
        ledger.verify_funds("EURC").unwrap();
    }

    #[test]
    fn conservation_across_full_bid_cycle() {
        let mut ledger = SettlementLedger::new();
        let a = AccountId::new();
        let b = AccountId::new();
        let seller = AccountId::new();
        let platform = AccountId::new();

        // A bids 50, is outbid by B at 75, B wins.
        ledger.escrow(a, USDC, 50);
        ledger.release_escrow(a, USDC, 50).unwrap();
        ledger.escrow(b, USDC, 75);
        ledger
            .settle_escrow(b, seller, platform, USDC, 75, 250)
            .unwrap();

        // A's refund is intact, net zero.
        assert_eq!(ledger.pending_of(a, USDC), 50);
        assert_eq!(ledger.escrowed_of(a, USDC), 0);
        // 75 × 250 / 10000 = 1.875 → 1
        assert_eq!(ledger.pending_of(platform, USDC), 1);
        assert_eq!(ledger.pending_of(seller, USDC), 74);
        ledger.verify_funds(USDC).unwrap();
    }
}
