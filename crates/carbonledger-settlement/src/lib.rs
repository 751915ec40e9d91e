//! # carbonledger-settlement
//!
//! Custody and fund movement for the marketplace.
//!
//! The [`SettlementLedger`] tracks per-participant pending balances and
//! bid escrow, splits platform fees (integer basis points, floor
//! division), and audits fund conservation after every settlement cycle.
//! It never touches credit ownership — the marketplace invokes the
//! registry for that, after funds are committed here.

pub mod fees;
pub mod ledger;

pub use fees::{fee_split, FeeSplit};
pub use ledger::SettlementLedger;
