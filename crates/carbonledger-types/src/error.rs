//! Error types for the CarbonLedger registry and marketplace.
//!
//! All errors use the `CL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Credit / registry errors
//! - 2xx: Payment / balance errors
//! - 3xx: Escrow errors
//! - 4xx: Listing errors
//! - 5xx: Auction errors
//! - 6xx: Settlement errors
//! - 9xx: General / internal errors
//!
//! Every error is rejected before any state change: a failed operation
//! leaves credits, listings, auctions, and balances exactly as they were.

use thiserror::Error;

use crate::{CreditId, ListingId};

/// Central error enum for all CarbonLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Credit / Registry Errors (1xx)
    // =================================================================
    /// The requested credit does not exist.
    #[error("CL_ERR_100: Credit not found: {0}")]
    CreditNotFound(CreditId),

    /// A credit with this serial number has already been minted.
    #[error("CL_ERR_101: Duplicate serial number: {serial}")]
    DuplicateSerial { serial: String },

    /// The vintage year is outside the accepted window.
    #[error("CL_ERR_102: Invalid vintage {vintage}: accepted window is {min}..={max}")]
    InvalidVintage { vintage: u16, min: u16, max: u16 },

    /// The amount is zero or otherwise unusable.
    #[error("CL_ERR_103: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The caller is not the current owner of the credit.
    #[error("CL_ERR_104: Not the owner of {0}")]
    NotOwner(CreditId),

    /// The credit has been retired and is permanently non-transferable.
    #[error("CL_ERR_105: Credit is not active: {0}")]
    CreditNotActive(CreditId),

    /// Transfer to the nil account or back to the sender.
    #[error("CL_ERR_106: Null or invalid transfer recipient")]
    NullRecipient,

    /// Retirement requires a non-empty reason.
    #[error("CL_ERR_107: Retirement reason must not be empty")]
    MissingReason,

    /// The account is not authorized to mint credits.
    #[error("CL_ERR_108: Unauthorized issuer")]
    UnauthorizedIssuer,

    /// The account is not authorized to verify credits.
    #[error("CL_ERR_109: Unauthorized verifier")]
    UnauthorizedVerifier,

    /// Confidence scores are percentages: 0..=100.
    #[error("CL_ERR_110: Invalid confidence score {0}: must be 0..=100")]
    InvalidConfidenceScore(u8),

    // =================================================================
    // Payment / Balance Errors (2xx)
    // =================================================================
    /// The tendered payment does not cover the amount due.
    #[error("CL_ERR_200: Insufficient payment: need {needed}, tendered {tendered}")]
    InsufficientPayment { needed: u64, tendered: u64 },

    /// Not enough withdrawable balance.
    #[error("CL_ERR_201: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// A price × amount product exceeded the monetary range.
    #[error("CL_ERR_202: Amount overflow in monetary computation")]
    AmountOverflow,

    // =================================================================
    // Escrow Errors (3xx)
    // =================================================================
    /// Escrow release or capture exceeded the held amount.
    #[error("CL_ERR_300: Insufficient escrow")]
    InsufficientEscrow,

    // =================================================================
    // Listing Errors (4xx)
    // =================================================================
    /// The requested listing does not exist.
    #[error("CL_ERR_400: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The listing is not in the Active state.
    #[error("CL_ERR_401: Listing is not active: {0}")]
    ListingNotActive(ListingId),

    /// The listing's expiry time has passed.
    #[error("CL_ERR_402: Listing has expired: {0}")]
    ListingExpired(ListingId),

    /// The caller is not the seller of the listing.
    #[error("CL_ERR_403: Not the seller of {0}")]
    NotSeller(ListingId),

    /// Prices must be strictly positive.
    #[error("CL_ERR_404: Invalid price: must be greater than zero")]
    InvalidPrice,

    /// The duration is outside the accepted bounds.
    #[error("CL_ERR_405: Invalid duration: {seconds}s outside {min_secs}s..={max_secs}s")]
    InvalidDuration {
        seconds: i64,
        min_secs: i64,
        max_secs: i64,
    },

    /// Buyer and seller are the same account (wash trading).
    #[error("CL_ERR_406: Self-trade blocked: buyer and seller are the same account")]
    SelfTradeBlocked,

    // =================================================================
    // Auction Errors (5xx)
    // =================================================================
    /// No auction exists for this credit.
    #[error("CL_ERR_500: Auction not found for {0}")]
    AuctionNotFound(CreditId),

    /// The auction is not in the Active state.
    #[error("CL_ERR_501: Auction is not active for {0}")]
    AuctionNotActive(CreditId),

    /// The auction's end time has passed; no further bids.
    #[error("CL_ERR_502: Auction has ended for {0}")]
    AuctionEnded(CreditId),

    /// The auction cannot be ended before its end time.
    #[error("CL_ERR_503: Auction is still active for {0}")]
    AuctionStillActive(CreditId),

    /// The auction has already been settled or failed.
    #[error("CL_ERR_504: Auction already ended for {0}")]
    AuctionAlreadyEnded(CreditId),

    /// At most one live auction per credit.
    #[error("CL_ERR_505: An auction is already active for {0}")]
    AuctionAlreadyActive(CreditId),

    /// Bids must be at least the starting price and strictly exceed the
    /// current bid.
    #[error("CL_ERR_506: Bid too low: offered {offered}, must exceed {floor}")]
    BidTooLow { offered: u64, floor: u64 },

    /// The reserve price must be at least the starting price.
    #[error("CL_ERR_507: Invalid reserve: {reserve} below starting price {starting}")]
    InvalidReserve { reserve: u64, starting: u64 },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// Fund conservation invariant violated — critical safety alert.
    #[error("CL_ERR_600: Fund conservation violation: {reason}")]
    FundConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (fee rate out of bounds, inverted windows, etc.).
    #[error("CL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
