//! Timed-auction records.
//!
//! An auction is a time-bounded competitive sale of a whole credit, keyed
//! by the credit id — at most one live auction per credit. Bids are total
//! hammer prices and are escrowed in full; the auction settles only if the
//! winning bid clears the reserve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, CreditId};

/// Lifecycle status of an auction.
///
/// `Active → {Settled, Failed}`, both terminal and reachable only after
/// `end_time` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    Active,
    /// The winning bid cleared the reserve; the credit moved to the winner.
    Settled,
    /// No bid, or the best bid fell short of the reserve. Credit stays
    /// with the seller; the bidder is refunded in full.
    Failed,
}

impl AuctionStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A timed auction over a single credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub credit_id: CreditId,
    pub seller: AccountId,
    /// Minimum acceptable first bid (total hammer price).
    pub starting_price: u64,
    /// The auction settles only if the final bid reaches this. Always
    /// `>= starting_price`.
    pub reserve_price: u64,
    pub current_bid: Option<u64>,
    pub current_bidder: Option<AccountId>,
    pub payment_asset: Asset,
    pub created_at: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    pub bid_count: u64,
}

impl Auction {
    /// Whether bidding has closed at `now`. Like listing expiry, this is
    /// a property of the clock, not of the stored status.
    #[must_use]
    pub fn has_ended_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// The smallest amount a new bid must strictly exceed, or meet when
    /// there is no bid yet.
    ///
    /// First bid: `>= starting_price`. Later bids: `> current_bid` —
    /// strict, so equal bids never tie-accept.
    #[must_use]
    pub fn bid_floor(&self) -> u64 {
        match self.current_bid {
            Some(bid) => bid,
            None => self.starting_price,
        }
    }

    /// Whether `offered` is an acceptable next bid.
    #[must_use]
    pub fn accepts_bid(&self, offered: u64) -> bool {
        match self.current_bid {
            Some(bid) => offered > bid,
            None => offered >= self.starting_price,
        }
    }

    /// Whether the current state would settle (reserve met, bidder present).
    #[must_use]
    pub fn reserve_met(&self) -> bool {
        matches!(self.current_bid, Some(bid) if bid >= self.reserve_price)
            && self.current_bidder.is_some()
    }
}

impl std::fmt::Display for Auction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Auction[{}] start={} reserve={} bid={:?} bids={} {}",
            self.credit_id,
            self.starting_price,
            self.reserve_price,
            self.current_bid,
            self.bid_count,
            self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_auction(starting: u64, reserve: u64) -> Auction {
        let now = Utc::now();
        Auction {
            credit_id: CreditId(1),
            seller: AccountId::new(),
            starting_price: starting,
            reserve_price: reserve,
            current_bid: None,
            current_bidder: None,
            payment_asset: "USDC".to_string(),
            created_at: now,
            end_time: now + Duration::hours(24),
            status: AuctionStatus::Active,
            bid_count: 0,
        }
    }

    #[test]
    fn first_bid_must_meet_starting_price() {
        let a = make_auction(50, 100);
        assert!(!a.accepts_bid(49));
        assert!(a.accepts_bid(50));
        assert!(a.accepts_bid(51));
    }

    #[test]
    fn later_bids_must_strictly_exceed() {
        let mut a = make_auction(50, 100);
        a.current_bid = Some(75);
        a.current_bidder = Some(AccountId::new());
        assert!(!a.accepts_bid(75), "equal bid must never tie-accept");
        assert!(a.accepts_bid(76));
    }

    #[test]
    fn reserve_met_requires_bid_at_reserve() {
        let mut a = make_auction(50, 100);
        assert!(!a.reserve_met());
        a.current_bid = Some(99);
        a.current_bidder = Some(AccountId::new());
        assert!(!a.reserve_met());
        a.current_bid = Some(100);
        assert!(a.reserve_met());
    }

    #[test]
    fn end_is_clock_based() {
        let a = make_auction(50, 100);
        assert!(!a.has_ended_at(a.created_at));
        assert!(a.has_ended_at(a.end_time));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!AuctionStatus::Active.is_terminal());
        assert!(AuctionStatus::Settled.is_terminal());
        assert!(AuctionStatus::Failed.is_terminal());
    }
}
