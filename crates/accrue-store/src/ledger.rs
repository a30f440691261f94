//! Persistent payout ledger.
//!
//! A minimal host-side account book that implements both delivery
//! capabilities over the same RocksDB database as the accumulator state:
//! minting credits a reward-token balance and raises the token supply,
//! transferring moves native currency out of a funded treasury. Every
//! operation is a single [`WriteBatch`].

use std::sync::Arc;

use rocksdb::{WriteBatch, DB};

use accrue_core::delivery::{NativeTransfer, TokenMinter};
use accrue_core::error::{DeliveryError, StoreError};
use accrue_core::types::{Address, Amount};

use crate::storage::{cf_handle, CF_LEDGER_META, CF_NATIVE_BALANCES, CF_TOKEN_BALANCES};

const META_TREASURY: &[u8] = b"treasury";
const META_TOKEN_SUPPLY: &[u8] = b"token_supply";

/// Account book backed by the reward store's database.
#[derive(Clone)]
pub struct RocksLedger {
    db: Arc<DB>,
}

impl RocksLedger {
    pub(crate) fn new(db: Arc<DB>) -> Self {
        Self { db }
    }

    /// Native currency held for transfer payouts.
    pub fn treasury(&self) -> Result<Amount, StoreError> {
        self.read(CF_LEDGER_META, META_TREASURY)
    }

    /// Total reward tokens minted so far.
    pub fn token_supply(&self) -> Result<Amount, StoreError> {
        self.read(CF_LEDGER_META, META_TOKEN_SUPPLY)
    }

    pub fn token_balance(&self, address: &Address) -> Result<Amount, StoreError> {
        self.read(CF_TOKEN_BALANCES, address.as_bytes())
    }

    pub fn native_balance(&self, address: &Address) -> Result<Amount, StoreError> {
        self.read(CF_NATIVE_BALANCES, address.as_bytes())
    }

    /// Add `amount` to the treasury. Returns the new treasury balance.
    pub fn fund_treasury(&self, amount: Amount) -> Result<Amount, DeliveryError> {
        let treasury = self
            .treasury()?
            .checked_add(amount)
            .ok_or(DeliveryError::Overflow)?;
        self.write(CF_LEDGER_META, META_TREASURY, treasury)?;
        tracing::debug!(amount = %amount, treasury = %treasury, "treasury funded");
        Ok(treasury)
    }

    fn read(&self, cf_name: &str, key: &[u8]) -> Result<Amount, StoreError> {
        let cf = cf_handle(&self.db, cf_name)?;
        match self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => decode_amount(&bytes),
            None => Ok(0),
        }
    }

    fn write(&self, cf_name: &str, key: &[u8], value: Amount) -> Result<(), StoreError> {
        let cf = cf_handle(&self.db, cf_name)?;
        self.db
            .put_cf(&cf, key, value.to_le_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl TokenMinter for RocksLedger {
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError> {
        let balance = self
            .token_balance(to)?
            .checked_add(amount)
            .ok_or(DeliveryError::Overflow)?;
        let supply = self
            .token_supply()?
            .checked_add(amount)
            .ok_or(DeliveryError::Overflow)?;

        let cf_balances = cf_handle(&self.db, CF_TOKEN_BALANCES)?;
        let cf_meta = cf_handle(&self.db, CF_LEDGER_META)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf_balances, to.as_bytes(), balance.to_le_bytes());
        batch.put_cf(cf_meta, META_TOKEN_SUPPLY, supply.to_le_bytes());
        self.commit(batch)?;

        tracing::debug!(%to, amount = %amount, "minted reward tokens");
        Ok(())
    }
}

impl NativeTransfer for RocksLedger {
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), DeliveryError> {
        let treasury = self.treasury()?;
        let remaining = treasury
            .checked_sub(amount)
            .ok_or(DeliveryError::InsufficientFunds {
                have: treasury,
                need: amount,
            })?;
        let balance = self
            .native_balance(to)?
            .checked_add(amount)
            .ok_or(DeliveryError::Overflow)?;

        let cf_balances = cf_handle(&self.db, CF_NATIVE_BALANCES)?;
        let cf_meta = cf_handle(&self.db, CF_LEDGER_META)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf_balances, to.as_bytes(), balance.to_le_bytes());
        batch.put_cf(cf_meta, META_TREASURY, remaining.to_le_bytes());
        self.commit(batch)?;

        tracing::debug!(%to, amount = %amount, "transferred native currency");
        Ok(())
    }
}

fn decode_amount(bytes: &[u8]) -> Result<Amount, StoreError> {
    let array: [u8; 16] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt("invalid amount length".into()))?;
    Ok(Amount::from_le_bytes(array))
}
