//! Error types for reward accrual.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccrualError {
    #[error("invalid state: {0}")] InvalidState(String),
    #[error("no rewards to claim")] NothingToClaim,
    #[error("arithmetic overflow")] Overflow,
    #[error("unsupported precision: {decimals} decimals (max {max})")] InvalidPrecision { decimals: u8, max: u8 },
    #[error("pool {pool} uses {stored} decimals, not {requested}")] PrecisionMismatch { pool: String, stored: u8, requested: u8 },
    #[error("invalid pool name: {0}")] InvalidPoolName(String),
    #[error(transparent)] Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend: {0}")] Backend(String),
    #[error("corrupt record: {0}")] Corrupt(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: expected 32 bytes, got {0}")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u128, need: u128 },
    #[error("balance overflow")] Overflow,
    #[error("delivery rejected: {0}")] Rejected(String),
    #[error(transparent)] Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error(transparent)] Accrual(#[from] AccrualError),
    #[error(transparent)] Delivery(#[from] DeliveryError),
}

impl From<StoreError> for ClaimError {
    fn from(e: StoreError) -> Self {
        ClaimError::Accrual(AccrualError::Store(e))
    }
}
