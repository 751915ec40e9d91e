//! Trade records: the marketplace audit trail.
//!
//! A [`Trade`] is the immutable record of a completed exchange — a direct
//! listing purchase or an auction settlement. Trades are append-only and
//! never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, CreditId, ListingId, TradeId};

/// How the exchange was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeKind {
    /// Fixed-price listing purchase.
    Direct,
    /// Auction settlement at the hammer price.
    Auction,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "DIRECT"),
            Self::Auction => write!(f, "AUCTION"),
        }
    }
}

/// An immutable record of a completed exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Deterministic from (credit, trade sequence).
    pub id: TradeId,
    /// The listing this trade filled. `None` for auction settlements.
    pub listing_id: Option<ListingId>,
    pub credit_id: CreditId,
    pub buyer: AccountId,
    pub seller: AccountId,
    /// Per-unit price for direct trades; total hammer price for auctions.
    pub price: u64,
    /// Units exchanged.
    pub amount: u64,
    pub payment_asset: Asset,
    pub kind: TradeKind,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    /// Gross value of the exchange before fees.
    #[must_use]
    pub fn notional(&self) -> u64 {
        match self.kind {
            // Hammer price is already the total.
            TradeKind::Auction => self.price,
            TradeKind::Direct => self.price.saturating_mul(self.amount),
        }
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} {} x{} @ {} {} = {}",
            self.id,
            self.kind,
            self.credit_id,
            self.amount,
            self.price,
            self.payment_asset,
            self.notional(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(kind: TradeKind, price: u64, amount: u64) -> Trade {
        Trade {
            id: TradeId::deterministic(1, 0),
            listing_id: (kind == TradeKind::Direct).then_some(ListingId(1)),
            credit_id: CreditId(1),
            buyer: AccountId::new(),
            seller: AccountId::new(),
            price,
            amount,
            payment_asset: "USDC".to_string(),
            kind,
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn direct_notional_is_price_times_amount() {
        let t = make_trade(TradeKind::Direct, 100, 7);
        assert_eq!(t.notional(), 700);
    }

    #[test]
    fn auction_notional_is_hammer_price() {
        let t = make_trade(TradeKind::Auction, 5_000, 1);
        assert_eq!(t.notional(), 5_000);
    }

    #[test]
    fn trade_display() {
        let t = make_trade(TradeKind::Direct, 100, 7);
        let s = format!("{t}");
        assert!(s.contains("DIRECT"));
        assert!(s.contains("700"));
    }

    #[test]
    fn trade_serde_roundtrip() {
        let t = make_trade(TradeKind::Auction, 5_000, 1);
        let json = serde_json::to_string(&t).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t.id, back.id);
        assert_eq!(t.price, back.price);
        assert_eq!(t.kind, back.kind);
        assert_eq!(back.listing_id, None);
    }
}
