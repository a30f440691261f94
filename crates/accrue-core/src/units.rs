//! Conversion between the external unit and rscore.
//!
//! `scale` multiplies by `10^decimals`; `unscale` floor-divides by it. The
//! remainder lost by `unscale` is never more than one external unit.

use crate::constants::{DEFAULT_RSCORE_DECIMALS, MAX_RSCORE_DECIMALS};
use crate::error::AccrualError;
use crate::types::{Amount, Rscore};

/// Fixed-point scaling between external amounts and rscore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    decimals: u8,
    factor: Rscore,
}

impl Precision {
    /// Create a precision of `decimals` digits.
    ///
    /// # Errors
    ///
    /// [`AccrualError::InvalidPrecision`] above [`MAX_RSCORE_DECIMALS`].
    pub fn new(decimals: u8) -> Result<Self, AccrualError> {
        if decimals > MAX_RSCORE_DECIMALS {
            return Err(AccrualError::InvalidPrecision {
                decimals,
                max: MAX_RSCORE_DECIMALS,
            });
        }
        let factor = Rscore::from(10u8)
            .checked_pow(Rscore::from(decimals))
            .ok_or(AccrualError::Overflow)?;
        Ok(Self { decimals, factor })
    }

    /// Number of decimal digits.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// `10^decimals` as rscore.
    pub fn factor(&self) -> Rscore {
        self.factor
    }

    /// Scale an external amount into rscore.
    pub fn to_rscore(&self, amount: Amount) -> Result<Rscore, AccrualError> {
        Rscore::from(amount)
            .checked_mul(self.factor)
            .ok_or(AccrualError::Overflow)
    }

    /// Floor an rscore value back into the external unit.
    ///
    /// Fails with [`AccrualError::Overflow`] if the result does not fit `u128`.
    pub fn to_amount(&self, rscore: Rscore) -> Result<Amount, AccrualError> {
        let whole = rscore / self.factor;
        u128::try_from(whole).map_err(|_| AccrualError::Overflow)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_RSCORE_DECIMALS,
            factor: Rscore::from(10u128.pow(DEFAULT_RSCORE_DECIMALS as u32)),
        }
    }
}
