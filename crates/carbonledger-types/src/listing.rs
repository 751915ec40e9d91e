//! Fixed-price listing records.
//!
//! A listing is a seller's standing offer to sell some or all of a credit's
//! amount at a fixed per-unit price until expiry. Partial purchases reduce
//! `amount_available`; the purchase that drains it flips the listing to
//! `Sold`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, CreditId, LedgerError, ListingId, Result};

/// Lifecycle status of a listing.
///
/// `Active → {Sold, Cancelled, Expired}`, all terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
    Expired,
}

impl ListingStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Sold => write!(f, "SOLD"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A fixed-price listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub credit_id: CreditId,
    pub seller: AccountId,
    /// Minor units of `payment_asset` per whole credit unit.
    pub price_per_unit: u64,
    /// Units still for sale. Monotonically decreasing.
    pub amount_available: u64,
    pub payment_asset: Asset,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: ListingStatus,
}

impl Listing {
    /// Whether the expiry time has passed at `now`.
    ///
    /// Expiry is a property of the clock, not of the stored status: a
    /// listing past `expires_at` is unpurchasable even before any sweep
    /// has flipped its status to `Expired`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Total price for `amount` units, with overflow checked.
    pub fn total_for(&self, amount: u64) -> Result<u64> {
        let total = u128::from(self.price_per_unit) * u128::from(amount);
        u64::try_from(total).map_err(|_| LedgerError::AmountOverflow)
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Listing[{}] {} x{} @ {} {} {}",
            self.id,
            self.credit_id,
            self.amount_available,
            self.price_per_unit,
            self.payment_asset,
            self.status,
        )
    }
}
