//! System-wide constants for CarbonLedger.

/// Fee rates are expressed in basis points of this denominator.
pub const FEE_DENOMINATOR: u64 = 10_000;

/// Upper bound on the configurable fee rate (10%). A misconfigured fee
/// rate above this is rejected at config construction.
pub const MAX_FEE_BPS: u64 = 1_000;

/// Earliest accepted vintage year (default window).
pub const DEFAULT_MIN_VINTAGE: u16 = 2000;

/// Latest accepted vintage year (default window).
pub const DEFAULT_MAX_VINTAGE: u16 = 2100;

/// Minimum listing duration in seconds (default bound).
pub const DEFAULT_MIN_LISTING_SECS: i64 = 60;

/// Maximum listing duration in seconds (default bound, 90 days).
pub const DEFAULT_MAX_LISTING_SECS: i64 = 90 * 24 * 60 * 60;

/// Minimum auction duration in seconds (default bound).
pub const DEFAULT_MIN_AUCTION_SECS: i64 = 5 * 60;

/// Maximum auction duration in seconds (default bound, 30 days).
pub const DEFAULT_MAX_AUCTION_SECS: i64 = 30 * 24 * 60 * 60;

/// Default settlement asset.
pub const DEFAULT_PAYMENT_ASSET: &str = "USDC";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "CarbonLedger";
