//! Timed-auction operations.
//!
//! State machine: `Active → {Settled, Failed}`, transitions only after
//! `end_time`. Bids escrow the full hammer price; the previous bidder's
//! escrow is released the moment a higher bid commits.
//!
//! The bid path follows a strict two-phase discipline: the auction's
//! `current_bid` / `current_bidder` fields are committed *before* any
//! fund movement is issued, so anything re-entered during the refund
//! observes the already-updated winner and cannot double-win.

use chrono::{DateTime, Duration, Utc};

use carbonledger_registry::CreditRegistry;
use carbonledger_settlement::SettlementLedger;
use carbonledger_types::{
    AccountId, Asset, Auction, AuctionStatus, CreditId, LedgerError, LifecycleEvent, Result,
    TradeId, TradeKind,
};

use crate::Marketplace;

impl Marketplace {
    /// Open a timed auction for a whole credit.
    ///
    /// # Errors
    /// - `CreditNotFound`, `NotOwner`, `CreditNotActive`
    /// - `InvalidPrice` for a zero starting price
    /// - `InvalidReserve` if the reserve is below the starting price
    /// - `AuctionAlreadyActive` if a live auction exists for this credit
    /// - `InvalidDuration` outside the configured bounds
    #[allow(clippy::too_many_arguments)]
    pub fn create_auction(
        &mut self,
        registry: &CreditRegistry,
        seller: AccountId,
        credit_id: CreditId,
        starting_price: u64,
        reserve_price: u64,
        duration: Duration,
        payment_asset: Asset,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let credit = registry
            .credit(credit_id)
            .ok_or(LedgerError::CreditNotFound(credit_id))?;
        if credit.owner != seller {
            return Err(LedgerError::NotOwner(credit_id));
        }
        if !credit.is_active() {
            return Err(LedgerError::CreditNotActive(credit_id));
        }
        if starting_price == 0 {
            return Err(LedgerError::InvalidPrice);
        }
        if reserve_price < starting_price {
            return Err(LedgerError::InvalidReserve {
                reserve: reserve_price,
                starting: starting_price,
            });
        }
        if self
            .auctions
            .get(&credit_id)
            .is_some_and(|a| a.status == AuctionStatus::Active)
        {
            return Err(LedgerError::AuctionAlreadyActive(credit_id));
        }
        self.config.check_auction_duration(duration)?;

        // A terminal auction for this credit is replaced; its outcome
        // lives on in the trade log and events.
        self.auctions.insert(
            credit_id,
            Auction {
                credit_id,
                seller,
                starting_price,
                reserve_price,
                current_bid: None,
                current_bidder: None,
                payment_asset,
                created_at: now,
                end_time: now + duration,
                status: AuctionStatus::Active,
                bid_count: 0,
            },
        );

        tracing::info!(
            credit_id = %credit_id,
            seller = %seller,
            starting_price,
            reserve_price,
            "Auction created"
        );

        self.outbox.push(
            LifecycleEvent::AuctionCreated {
                credit_id,
                seller,
                starting_price,
                reserve_price,
            },
            now,
        );

        Ok(())
    }

    /// Place a bid of `amount` (total hammer price) on a credit's auction.
    ///
    /// A first bid must meet the starting price; every later bid must
    /// strictly exceed the current one — equal bids never tie-accept.
    /// The full bid is escrowed; the outbid bidder's escrow is released
    /// in full, and any overpayment is credited back as change.
    ///
    /// # Errors
    /// - `AuctionNotFound`, `AuctionNotActive`
    /// - `AuctionEnded` once `end_time` has passed (clock check)
    /// - `SelfTradeBlocked` if the seller bids on their own auction
    /// - `BidTooLow`, `InsufficientPayment`
    pub fn place_bid(
        &mut self,
        ledger: &mut SettlementLedger,
        credit_id: CreditId,
        bidder: AccountId,
        amount: u64,
        payment: u64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        // -- Checks --
        let auction = self
            .auctions
            .get_mut(&credit_id)
            .ok_or(LedgerError::AuctionNotFound(credit_id))?;
        if auction.status != AuctionStatus::Active {
            return Err(LedgerError::AuctionNotActive(credit_id));
        }
        if auction.has_ended_at(now) {
            return Err(LedgerError::AuctionEnded(credit_id));
        }
        if bidder == auction.seller {
            return Err(LedgerError::SelfTradeBlocked);
        }
        if !auction.accepts_bid(amount) {
            return Err(LedgerError::BidTooLow {
                offered: amount,
                floor: auction.bid_floor(),
            });
        }
        if payment < amount {
            return Err(LedgerError::InsufficientPayment {
                needed: amount,
                tendered: payment,
            });
        }

        // -- Effects: the new winner is committed before any fund moves. --
        let previous = auction.current_bid.zip(auction.current_bidder);
        auction.current_bid = Some(amount);
        auction.current_bidder = Some(bidder);
        auction.bid_count += 1;
        let bid_count = auction.bid_count;
        let payment_asset = auction.payment_asset.clone();

        // -- Interactions: refund the outbid escrow, then take the new one. --
        if let Some((prev_amount, prev_bidder)) = previous {
            ledger.release_escrow(prev_bidder, &payment_asset, prev_amount)?;
            tracing::debug!(
                credit_id = %credit_id,
                outbid = %prev_bidder,
                refunded = prev_amount,
                "Previous bidder refunded"
            );
        }
        ledger.escrow(bidder, &payment_asset, amount);
        if payment > amount {
            ledger.credit_pending(bidder, &payment_asset, payment - amount);
        }

        tracing::info!(
            credit_id = %credit_id,
            bidder = %bidder,
            amount,
            bid_count,
            "Bid accepted"
        );

        self.outbox.push(
            LifecycleEvent::AuctionBid {
                credit_id,
                bidder,
                amount,
                bid_count,
            },
            now,
        );

        Ok(())
    }

    /// Close an auction whose `end_time` has passed.
    ///
    /// If the reserve is met and the credit is still deliverable, the
    /// winning escrow is split (fee floored to the fee recipient, the
    /// rest to the seller), the credit moves to the winner, and a trade
    /// is recorded. Otherwise the auction fails: the current bidder (if
    /// any) is refunded in full and the credit stays with the seller.
    ///
    /// Returns the settlement trade id, or `None` for a failed auction.
    ///
    /// # Errors
    /// - `AuctionNotFound`
    /// - `AuctionAlreadyEnded` if already settled or failed
    /// - `AuctionStillActive` before `end_time`
    pub fn end_auction(
        &mut self,
        registry: &mut CreditRegistry,
        ledger: &mut SettlementLedger,
        credit_id: CreditId,
        now: DateTime<Utc>,
    ) -> Result<Option<TradeId>> {
        // -- Checks --
        let auction = self
            .auctions
            .get(&credit_id)
            .ok_or(LedgerError::AuctionNotFound(credit_id))?;
        if auction.status != AuctionStatus::Active {
            return Err(LedgerError::AuctionAlreadyEnded(credit_id));
        }
        if !auction.has_ended_at(now) {
            return Err(LedgerError::AuctionStillActive(credit_id));
        }

        let seller = auction.seller;
        let payment_asset = auction.payment_asset.clone();
        let current = auction.current_bid.zip(auction.current_bidder);

        // Settlement additionally requires the credit to be deliverable:
        // still active and still owned by the seller. A credit retired or
        // moved mid-auction fails the auction instead of stranding the
        // winner's escrow.
        let deliverable = registry
            .credit(credit_id)
            .is_some_and(|c| c.is_active() && c.owner == seller);
        let winning = auction
            .reserve_met()
            .then_some(current)
            .flatten()
            .filter(|_| deliverable);

        match winning {
            Some((hammer_price, winner)) => {
                // -- Effects first: the terminal status commits before funds move. --
                let amount = registry
                    .credit(credit_id)
                    .map(|c| c.amount)
                    .ok_or(LedgerError::CreditNotFound(credit_id))?;
                if let Some(auction) = self.auctions.get_mut(&credit_id) {
                    auction.status = AuctionStatus::Settled;
                }

                let trade_id = self.record_trade(
                    None,
                    credit_id,
                    winner,
                    seller,
                    hammer_price,
                    amount,
                    &payment_asset,
                    TradeKind::Auction,
                    now,
                );

                // -- Interactions --
                let split = ledger.settle_escrow(
                    winner,
                    seller,
                    self.config.fee_recipient,
                    &payment_asset,
                    hammer_price,
                    self.config.fee_bps,
                )?;
                registry.transfer(credit_id, seller, winner, now)?;

                tracing::info!(
                    credit_id = %credit_id,
                    winner = %winner,
                    hammer_price,
                    fee = split.fee,
                    "Auction settled"
                );

                self.outbox.push(
                    LifecycleEvent::AuctionEnded {
                        credit_id,
                        winner: Some(winner),
                        price: hammer_price,
                    },
                    now,
                );

                Ok(Some(trade_id))
            }
            None => {
                if let Some(auction) = self.auctions.get_mut(&credit_id) {
                    auction.status = AuctionStatus::Failed;
                }

                if let Some((bid, bidder)) = current {
                    ledger.release_escrow(bidder, &payment_asset, bid)?;
                    tracing::debug!(
                        credit_id = %credit_id,
                        bidder = %bidder,
                        refunded = bid,
                        "Failed-auction bidder refunded"
                    );
                }

                tracing::info!(credit_id = %credit_id, "Auction failed (reserve not met)");

                self.outbox.push(
                    LifecycleEvent::AuctionEnded {
                        credit_id,
                        winner: None,
                        price: 0,
                    },
                    now,
                );

                Ok(None)
            }
        }
    }
}
