//! # carbonledger-types
//!
//! Shared types, errors, and configuration for the **CarbonLedger** credit
//! registry and marketplace settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`CreditId`], [`ListingId`], [`AccountId`], [`ProjectId`], [`TradeId`], [`EvidenceRef`]
//! - **Credit model**: [`Credit`], [`CreditStatus`], [`Verification`], [`Retirement`]
//! - **Listing model**: [`Listing`], [`ListingStatus`]
//! - **Auction model**: [`Auction`], [`AuctionStatus`]
//! - **Trade model**: [`Trade`], [`TradeKind`]
//! - **Event model**: [`LifecycleEvent`], [`EventOutbox`]
//! - **Balance model**: [`BalanceEntry`], [`Asset`]
//! - **Configuration**: [`RegistryConfig`], [`MarketConfig`]
//! - **Errors**: [`LedgerError`] with `CL_ERR_` prefix codes
//! - **Constants**: fee denominator, bounds, and defaults

pub mod auction;
pub mod balance;
pub mod config;
pub mod constants;
pub mod credit;
pub mod error;
pub mod event;
pub mod ids;
pub mod listing;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use carbonledger_types::{Credit, Listing, Auction, Trade, ...};

pub use auction::*;
pub use balance::*;
pub use config::*;
pub use credit::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use listing::*;
pub use trade::*;

// Constants are accessed via `carbonledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
