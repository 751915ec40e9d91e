//! # carbonledger-market
//!
//! The marketplace: fixed-price listings and timed auctions over registry
//! credits, with bid escrow and fee settlement.
//!
//! ## Control flow
//!
//! A caller invokes a marketplace operation → the marketplace validates
//! against [`carbonledger_registry::CreditRegistry`] state → on success it
//! mutates its own listing/auction state, moves funds through
//! [`carbonledger_settlement::SettlementLedger`], and finally invokes the
//! registry transfer — then emits lifecycle events. Checks, effects,
//! interactions, in that order, always.

pub mod auctions;
pub mod listings;
pub mod marketplace;

pub use marketplace::Marketplace;
