//! Accumulator constants.

/// Default number of decimal digits between the external unit and rscore.
///
/// With 18 decimals, 1 external unit = 10^18 rscore.
pub const DEFAULT_RSCORE_DECIMALS: u8 = 18;

/// Largest supported precision.
///
/// `u128::MAX * 10^38` still fits in 256 bits, so scaling an external amount
/// can never overflow at or below this value.
pub const MAX_RSCORE_DECIMALS: u8 = 38;

/// Pool name used when the host does not pick one.
pub const DEFAULT_POOL_NAME: &str = "rewards";

/// Longest pool name accepted, in bytes. Store keys carry the length in one byte.
pub const MAX_POOL_NAME_LEN: usize = 255;
