//! Lifecycle events: the only channel external collaborators see.
//!
//! Each state-changing operation pushes exactly one primary event into its
//! component's [`EventOutbox`] after the mutation is committed — never
//! before, and never on a failed operation. Consumers (backend indexer,
//! dashboard read-model, notification services) drain the outbox; they
//! cannot mutate registry or marketplace state through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CreditId, ListingId, TradeId};

/// A committed registry or marketplace state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    CreditMinted {
        credit_id: CreditId,
        owner: AccountId,
        amount: u64,
        serial_number: String,
    },
    CreditTransferred {
        credit_id: CreditId,
        from: AccountId,
        to: AccountId,
    },
    CreditRetired {
        credit_id: CreditId,
        owner: AccountId,
        amount: u64,
        beneficiary: String,
    },
    CreditVerified {
        credit_id: CreditId,
        verifier: AccountId,
        confidence_score: u8,
    },
    ListingCreated {
        listing_id: ListingId,
        credit_id: CreditId,
        seller: AccountId,
        price_per_unit: u64,
        amount: u64,
    },
    ListingUpdated {
        listing_id: ListingId,
        price_per_unit: u64,
    },
    ListingCancelled {
        listing_id: ListingId,
    },
    ListingExpired {
        listing_id: ListingId,
    },
    ListingSold {
        listing_id: ListingId,
        credit_id: CreditId,
        buyer: AccountId,
        seller: AccountId,
        amount: u64,
        total: u64,
    },
    TradeExecuted {
        trade_id: TradeId,
        credit_id: CreditId,
        buyer: AccountId,
        seller: AccountId,
        amount: u64,
        total: u64,
    },
    AuctionCreated {
        credit_id: CreditId,
        seller: AccountId,
        starting_price: u64,
        reserve_price: u64,
    },
    AuctionBid {
        credit_id: CreditId,
        bidder: AccountId,
        amount: u64,
        bid_count: u64,
    },
    AuctionEnded {
        credit_id: CreditId,
        winner: Option<AccountId>,
        price: u64,
    },
}

/// A recorded event with its commit timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub event: LifecycleEvent,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only outbox of committed lifecycle events.
///
/// The owning component pushes; consumers drain. There is no way to
/// insert, reorder, or rewrite entries.
#[derive(Debug, Default)]
pub struct EventOutbox {
    events: Vec<RecordedEvent>,
}

impl EventOutbox {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record a committed event. Called by the owning component only,
    /// after its state mutation is complete.
    pub fn push(&mut self, event: LifecycleEvent, recorded_at: DateTime<Utc>) {
        self.events.push(RecordedEvent { event, recorded_at });
    }

    /// Drain all pending events in commit order.
    pub fn drain(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at pending events without consuming them.
    #[must_use]
    pub fn pending(&self) -> &[RecordedEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
