//! Configuration types for the registry and marketplace.
//!
//! Both configs validate on construction: an out-of-bounds fee rate or an
//! inverted window is a [`LedgerError::Configuration`], not a latent bug
//! discovered at settlement time.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, LedgerError, Result};

/// Registry-level configuration: which vintages are mintable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Earliest accepted vintage year, inclusive.
    pub min_vintage: u16,
    /// Latest accepted vintage year, inclusive.
    pub max_vintage: u16,
}

impl RegistryConfig {
    pub fn new(min_vintage: u16, max_vintage: u16) -> Result<Self> {
        if min_vintage > max_vintage {
            return Err(LedgerError::Configuration(format!(
                "vintage window inverted: {min_vintage} > {max_vintage}"
            )));
        }
        Ok(Self {
            min_vintage,
            max_vintage,
        })
    }

    /// Whether `vintage` falls inside the accepted window.
    #[must_use]
    pub fn accepts_vintage(&self, vintage: u16) -> bool {
        (self.min_vintage..=self.max_vintage).contains(&vintage)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            min_vintage: constants::DEFAULT_MIN_VINTAGE,
            max_vintage: constants::DEFAULT_MAX_VINTAGE,
        }
    }
}

/// Marketplace configuration: fee routing and duration bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Platform fee in basis points (1/100 of a percent). Bounded by
    /// [`constants::MAX_FEE_BPS`].
    pub fee_bps: u64,
    /// Account credited with collected fees.
    pub fee_recipient: AccountId,
    /// Accepted listing duration bounds, inclusive, in seconds.
    pub min_listing_secs: i64,
    pub max_listing_secs: i64,
    /// Accepted auction duration bounds, inclusive, in seconds.
    pub min_auction_secs: i64,
    pub max_auction_secs: i64,
}

impl MarketConfig {
    pub fn new(fee_bps: u64, fee_recipient: AccountId) -> Result<Self> {
        if fee_bps > constants::MAX_FEE_BPS {
            return Err(LedgerError::Configuration(format!(
                "fee rate {fee_bps} bps exceeds maximum {}",
                constants::MAX_FEE_BPS
            )));
        }
        if fee_recipient.is_nil() {
            return Err(LedgerError::Configuration(
                "fee recipient must not be the nil account".to_string(),
            ));
        }
        Ok(Self {
            fee_bps,
            fee_recipient,
            min_listing_secs: constants::DEFAULT_MIN_LISTING_SECS,
            max_listing_secs: constants::DEFAULT_MAX_LISTING_SECS,
            min_auction_secs: constants::DEFAULT_MIN_AUCTION_SECS,
            max_auction_secs: constants::DEFAULT_MAX_AUCTION_SECS,
        })
    }

    /// Validate a listing duration against the configured bounds.
    pub fn check_listing_duration(&self, duration: Duration) -> Result<()> {
        let secs = duration.num_seconds();
        if secs < self.min_listing_secs || secs > self.max_listing_secs {
            return Err(LedgerError::InvalidDuration {
                seconds: secs,
                min_secs: self.min_listing_secs,
                max_secs: self.max_listing_secs,
            });
        }
        Ok(())
    }

    /// Validate an auction duration against the configured bounds.
    pub fn check_auction_duration(&self, duration: Duration) -> Result<()> {
        let secs = duration.num_seconds();
        if secs < self.min_auction_secs || secs > self.max_auction_secs {
            return Err(LedgerError::InvalidDuration {
                seconds: secs,
                min_secs: self.min_auction_secs,
                max_secs: self.max_auction_secs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_config_accepts_window() {
        let cfg = RegistryConfig::new(2015, 2030).unwrap();
        assert!(cfg.accepts_vintage(2015));
        assert!(cfg.accepts_vintage(2030));
        assert!(!cfg.accepts_vintage(2014));
        assert!(!cfg.accepts_vintage(2031));
    }

    #[test]
    fn inverted_vintage_window_rejected() {
        let err = RegistryConfig::new(2030, 2015).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn fee_bound_enforced() {
        let recipient = AccountId::new();
        assert!(MarketConfig::new(0, recipient).is_ok());
        assert!(MarketConfig::new(constants::MAX_FEE_BPS, recipient).is_ok());
        let err = MarketConfig::new(constants::MAX_FEE_BPS + 1, recipient).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn nil_fee_recipient_rejected() {
        let err = MarketConfig::new(250, AccountId::nil()).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn listing_duration_bounds() {
        let cfg = MarketConfig::new(250, AccountId::new()).unwrap();
        assert!(cfg.check_listing_duration(Duration::hours(1)).is_ok());
        assert!(cfg.check_listing_duration(Duration::seconds(1)).is_err());
        assert!(cfg.check_listing_duration(Duration::days(365)).is_err());
    }

    #[test]
    fn market_config_serde_roundtrip() {
        let cfg = MarketConfig::new(250, AccountId::new()).unwrap();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: MarketConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.fee_bps, back.fee_bps);
        assert_eq!(cfg.fee_recipient, back.fee_recipient);
    }
}
