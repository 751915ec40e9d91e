//! The marketplace: owner of listing and auction tables and the trade log.
//!
//! Operations validate against registry state, mutate marketplace state,
//! move funds through the settlement ledger, and only then invoke the
//! registry transfer — the checks-effects-interactions ordering that keeps
//! fund movement non-reentrant (see the bid path in `auctions.rs`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use carbonledger_types::{
    AccountId, Asset, Auction, CreditId, EventOutbox, Listing, ListingId, MarketConfig, Trade,
    TradeId, TradeKind,
};

/// Fixed-price listings, per-credit auctions, and the append-only trade
/// log. Collaborating managers (registry, settlement ledger) are passed
/// into each operation; the marketplace holds no references.
pub struct Marketplace {
    pub(crate) config: MarketConfig,
    pub(crate) listings: HashMap<ListingId, Listing>,
    /// At most one auction per credit; terminal auctions are replaced on
    /// the next `create_auction` for the same credit.
    pub(crate) auctions: HashMap<CreditId, Auction>,
    pub(crate) trades: Vec<Trade>,
    pub(crate) next_listing_id: ListingId,
    pub(crate) trade_sequence: u64,
    pub(crate) outbox: EventOutbox,
}

impl Marketplace {
    #[must_use]
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            listings: HashMap::new(),
            auctions: HashMap::new(),
            trades: Vec::new(),
            next_listing_id: ListingId(0),
            trade_sequence: 0,
            outbox: EventOutbox::new(),
        }
    }

    /// Append a trade to the audit log. Trade ids are deterministic from
    /// (credit, global trade sequence), so replaying the operation log
    /// reproduces them.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn record_trade(
        &mut self,
        listing_id: Option<ListingId>,
        credit_id: CreditId,
        buyer: AccountId,
        seller: AccountId,
        price: u64,
        amount: u64,
        payment_asset: &Asset,
        kind: TradeKind,
        now: DateTime<Utc>,
    ) -> TradeId {
        let id = TradeId::deterministic(credit_id.0, self.trade_sequence);
        self.trade_sequence += 1;
        self.trades.push(Trade {
            id,
            listing_id,
            credit_id,
            buyer,
            seller,
            price,
            amount,
            payment_asset: payment_asset.clone(),
            kind,
            executed_at: now,
        });
        id
    }

    // =====================================================================
    // Queries
    // =====================================================================

    #[must_use]
    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    #[must_use]
    pub fn auction(&self, credit_id: CreditId) -> Option<&Auction> {
        self.auctions.get(&credit_id)
    }

    /// The append-only trade log, in execution order.
    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// The marketplace event outbox, for external consumers to drain.
    pub fn outbox_mut(&mut self) -> &mut EventOutbox {
        &mut self.outbox
    }

    #[must_use]
    pub fn outbox(&self) -> &EventOutbox {
        &self.outbox
    }
}
