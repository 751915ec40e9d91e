//! Fixed-price listing operations.
//!
//! State machine: `Active → {Sold, Cancelled, Expired}`, all terminal.
//! Partial purchases keep the listing `Active` with a reduced
//! `amount_available`; the purchase that drains it flips it to `Sold` and
//! moves credit ownership to that buyer.

use chrono::{DateTime, Duration, Utc};

use carbonledger_registry::CreditRegistry;
use carbonledger_settlement::SettlementLedger;
use carbonledger_types::{
    AccountId, Asset, CreditId, LedgerError, LifecycleEvent, Listing, ListingId, ListingStatus,
    Result, TradeId, TradeKind,
};

use crate::Marketplace;

impl Marketplace {
    /// Create a fixed-price listing for (part of) a credit.
    ///
    /// `amount == 0` defaults to the credit's full amount.
    ///
    /// # Errors
    /// - `CreditNotFound`, `NotOwner`, `CreditNotActive`
    /// - `InvalidPrice` for a zero price
    /// - `InvalidDuration` outside the configured bounds
    /// - `InvalidAmount` above the credit's amount
    #[allow(clippy::too_many_arguments)]
    pub fn create_listing(
        &mut self,
        registry: &CreditRegistry,
        seller: AccountId,
        credit_id: CreditId,
        price_per_unit: u64,
        amount: u64,
        duration: Duration,
        payment_asset: Asset,
        now: DateTime<Utc>,
    ) -> Result<ListingId> {
        let credit = registry
            .credit(credit_id)
            .ok_or(LedgerError::CreditNotFound(credit_id))?;
        if credit.owner != seller {
            return Err(LedgerError::NotOwner(credit_id));
        }
        if !credit.is_active() {
            return Err(LedgerError::CreditNotActive(credit_id));
        }
        if price_per_unit == 0 {
            return Err(LedgerError::InvalidPrice);
        }
        self.config.check_listing_duration(duration)?;
        let amount = if amount == 0 { credit.amount } else { amount };
        if amount > credit.amount {
            return Err(LedgerError::InvalidAmount {
                reason: format!(
                    "listing amount {amount} exceeds credit amount {}",
                    credit.amount
                ),
            });
        }

        let id = self.next_listing_id;
        self.next_listing_id = self.next_listing_id.next();
        self.listings.insert(
            id,
            Listing {
                id,
                credit_id,
                seller,
                price_per_unit,
                amount_available: amount,
                payment_asset,
                created_at: now,
                expires_at: now + duration,
                status: ListingStatus::Active,
            },
        );

        tracing::info!(
            listing_id = %id,
            credit_id = %credit_id,
            seller = %seller,
            price_per_unit,
            amount,
            "Listing created"
        );

        self.outbox.push(
            LifecycleEvent::ListingCreated {
                listing_id: id,
                credit_id,
                seller,
                price_per_unit,
                amount,
            },
            now,
        );

        Ok(id)
    }

    /// Change the per-unit price of an active listing. Seller-only.
    pub fn update_listing(
        &mut self,
        listing_id: ListingId,
        seller: AccountId,
        new_price: u64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(LedgerError::ListingNotFound(listing_id))?;
        if listing.seller != seller {
            return Err(LedgerError::NotSeller(listing_id));
        }
        if listing.status != ListingStatus::Active {
            return Err(LedgerError::ListingNotActive(listing_id));
        }
        if new_price == 0 {
            return Err(LedgerError::InvalidPrice);
        }

        listing.price_per_unit = new_price;

        self.outbox.push(
            LifecycleEvent::ListingUpdated {
                listing_id,
                price_per_unit: new_price,
            },
            now,
        );

        Ok(())
    }

    /// Cancel an active listing. Seller-only, unconditional, immediate.
    pub fn cancel_listing(
        &mut self,
        listing_id: ListingId,
        seller: AccountId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(LedgerError::ListingNotFound(listing_id))?;
        if listing.seller != seller {
            return Err(LedgerError::NotSeller(listing_id));
        }
        if listing.status != ListingStatus::Active {
            return Err(LedgerError::ListingNotActive(listing_id));
        }

        listing.status = ListingStatus::Cancelled;

        tracing::info!(listing_id = %listing_id, "Listing cancelled");

        self.outbox
            .push(LifecycleEvent::ListingCancelled { listing_id }, now);

        Ok(())
    }

    /// Purchase `amount` units from a listing at the listed price.
    ///
    /// `total = price_per_unit × amount`; the fee (floored basis points)
    /// goes to the fee recipient and the remainder to the seller. Change
    /// from an overpayment lands on the buyer's pending balance. Credit
    /// ownership moves once, on the purchase that exhausts the listing.
    ///
    /// Expiry is checked against this call's `now`, not the stored
    /// status — a listing past `expires_at` is unpurchasable even if no
    /// sweep has flipped it to `Expired` yet.
    ///
    /// # Errors
    /// - `ListingNotFound`, `ListingNotActive`, `ListingExpired`
    /// - `SelfTradeBlocked` if the buyer is the seller
    /// - `InvalidAmount` for zero or more than is available
    /// - `AmountOverflow` if `price × amount` exceeds the monetary range
    /// - `InsufficientPayment` if `payment < total`
    /// - `NotOwner` / `CreditNotActive` if the credit can no longer be
    ///   delivered (moved or retired since listing)
    #[allow(clippy::too_many_arguments)]
    pub fn purchase_listing(
        &mut self,
        registry: &mut CreditRegistry,
        ledger: &mut SettlementLedger,
        listing_id: ListingId,
        buyer: AccountId,
        amount: u64,
        payment: u64,
        now: DateTime<Utc>,
    ) -> Result<TradeId> {
        // -- Checks: everything validated before any state change. --
        let listing = self
            .listings
            .get(&listing_id)
            .ok_or(LedgerError::ListingNotFound(listing_id))?;
        if listing.status != ListingStatus::Active {
            return Err(LedgerError::ListingNotActive(listing_id));
        }
        if listing.is_expired_at(now) {
            return Err(LedgerError::ListingExpired(listing_id));
        }
        if buyer == listing.seller {
            return Err(LedgerError::SelfTradeBlocked);
        }
        if amount == 0 || amount > listing.amount_available {
            return Err(LedgerError::InvalidAmount {
                reason: format!(
                    "purchase amount {amount} not in 1..={}",
                    listing.amount_available
                ),
            });
        }
        let total = listing.total_for(amount)?;
        if payment < total {
            return Err(LedgerError::InsufficientPayment {
                needed: total,
                tendered: payment,
            });
        }
        // The credit must still be deliverable: owned by the seller and
        // active. Re-checked here so a failed delivery can never strand
        // already-moved funds.
        let credit = registry
            .credit(listing.credit_id)
            .ok_or(LedgerError::CreditNotFound(listing.credit_id))?;
        if credit.owner != listing.seller {
            return Err(LedgerError::NotOwner(listing.credit_id));
        }
        if !credit.is_active() {
            return Err(LedgerError::CreditNotActive(listing.credit_id));
        }

        let seller = listing.seller;
        let credit_id = listing.credit_id;
        let price_per_unit = listing.price_per_unit;
        let payment_asset = listing.payment_asset.clone();

        // -- Effects: marketplace state commits before fund movement. --
        let exhausted = {
            let listing = self
                .listings
                .get_mut(&listing_id)
                .ok_or(LedgerError::ListingNotFound(listing_id))?;
            listing.amount_available -= amount;
            if listing.amount_available == 0 {
                listing.status = ListingStatus::Sold;
            }
            listing.amount_available == 0
        };

        let trade_id = self.record_trade(
            Some(listing_id),
            credit_id,
            buyer,
            seller,
            price_per_unit,
            amount,
            &payment_asset,
            TradeKind::Direct,
            now,
        );

        // -- Interactions: fund movement, then ownership, then events. --
        let split = ledger.settle_direct(
            buyer,
            seller,
            self.config.fee_recipient,
            &payment_asset,
            total,
            self.config.fee_bps,
        );
        if payment > total {
            ledger.credit_pending(buyer, &payment_asset, payment - total);
        }
        if exhausted {
            registry.transfer(credit_id, seller, buyer, now)?;
        }

        tracing::info!(
            listing_id = %listing_id,
            credit_id = %credit_id,
            buyer = %buyer,
            amount,
            total,
            fee = split.fee,
            exhausted,
            "Listing purchase settled"
        );

        self.outbox.push(
            LifecycleEvent::ListingSold {
                listing_id,
                credit_id,
                buyer,
                seller,
                amount,
                total,
            },
            now,
        );
        self.outbox.push(
            LifecycleEvent::TradeExecuted {
                trade_id,
                credit_id,
                buyer,
                seller,
                amount,
                total,
            },
            now,
        );

        Ok(trade_id)
    }

    /// Sweep listings whose expiry has passed: `Active → Expired`.
    ///
    /// Purchases never depend on this having run — expiry is enforced at
    /// purchase time from the clock. The sweep exists so read-models see
    /// a terminal status.
    pub fn expire_listings(&mut self, now: DateTime<Utc>) -> Vec<ListingId> {
        let mut expired: Vec<ListingId> = self
            .listings
            .values()
            .filter(|l| l.status == ListingStatus::Active && l.is_expired_at(now))
            .map(|l| l.id)
            .collect();
        expired.sort_unstable();

        for id in &expired {
            if let Some(listing) = self.listings.get_mut(id) {
                listing.status = ListingStatus::Expired;
            }
            self.outbox
                .push(LifecycleEvent::ListingExpired { listing_id: *id }, now);
        }

        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "Expired listings swept");
        }

        expired
    }
}
