//! # carbonledger-registry
//!
//! The credit registry: authoritative owner of credit records.
//!
//! - **Mint**: issuer-gated creation with registry-unique serials
//! - **Transfer**: atomic ownership movement with call-time re-validation
//! - **Retire**: one-way removal from circulation
//! - **Verify**: post-hoc verifier annotation, latest wins
//! - **Queries**: per-owner / per-project indices and supply totals
//!
//! The registry never moves funds — the marketplace invokes
//! [`CreditRegistry::transfer`] as the final step of a settlement, after
//! the settlement ledger has committed the fund movement.

pub mod registry;
pub mod transfer_log;

pub use registry::CreditRegistry;
pub use transfer_log::TransferRecord;
