//! Core accrual types: addresses, amounts, participant checkpoints.
//!
//! External amounts are `u128`. Internal rscore values are 256-bit so that
//! scaling by `10^precision` cannot overflow for any supported precision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// An amount in the external (caller-facing) unit.
pub type Amount = u128;

/// A value in the internal high-precision unit.
pub type Rscore = ruint::aliases::U256;

/// A 32-byte participant identity.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create an Address from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse 64 hex characters, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Per-participant checkpoint.
///
/// A participant never seen before is `ParticipantState::default()`: both
/// fields zero.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ParticipantState {
    /// Reward-rate sum at the participant's last checkpoint.
    pub entry_rate: Rscore,
    /// Reward folded in at checkpoints and not yet withdrawn, in rscore.
    pub accrued: Rscore,
}

impl ParticipantState {
    /// Whether this entry is indistinguishable from a never-seen participant.
    pub fn is_empty(&self) -> bool {
        self.entry_rate.is_zero() && self.accrued.is_zero()
    }
}
