//! Shared helpers for the integration tests.

use std::collections::BTreeMap;

use accrue_core::{AccrualError, Address, Amount, Precision, RewardAccumulator, RewardStore};
use accrue_core::MemoryRewardStore;

/// Address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 32])
}

/// In-memory accumulator at the default precision.
pub fn memory_accumulator(pool: &str) -> RewardAccumulator<MemoryRewardStore> {
    RewardAccumulator::new(pool, Precision::default(), MemoryRewardStore::new())
        .expect("valid pool name")
}

/// A staking host that owns eligible balances and drives an accumulator.
///
/// Every balance change is preceded by a checkpoint at the old balance, and
/// distributions use the current total stake as eligible supply.
pub struct StakingHost<S> {
    accumulator: RewardAccumulator<S>,
    stakes: BTreeMap<Address, Amount>,
    total: Amount,
}

impl<S: RewardStore> StakingHost<S> {
    pub fn new(accumulator: RewardAccumulator<S>) -> Self {
        Self {
            accumulator,
            stakes: BTreeMap::new(),
            total: 0,
        }
    }

    pub fn accumulator(&self) -> &RewardAccumulator<S> {
        &self.accumulator
    }

    pub fn stake_of(&self, who: &Address) -> Amount {
        self.stakes.get(who).copied().unwrap_or(0)
    }

    pub fn total_staked(&self) -> Amount {
        self.total
    }

    pub fn stakers(&self) -> Vec<Address> {
        self.stakes.keys().copied().collect()
    }

    pub fn stake(&mut self, who: &Address, amount: Amount) -> Result<(), AccrualError> {
        let old = self.stake_of(who);
        let new = old.checked_add(amount).ok_or(AccrualError::Overflow)?;
        let total = self.total.checked_add(amount).ok_or(AccrualError::Overflow)?;
        self.accumulator.update(who, old)?;
        self.stakes.insert(*who, new);
        self.total = total;
        Ok(())
    }

    pub fn unstake(&mut self, who: &Address, amount: Amount) -> Result<(), AccrualError> {
        let old = self.stake_of(who);
        let new = old
            .checked_sub(amount)
            .ok_or_else(|| AccrualError::InvalidState(format!("stake {old} below {amount}")))?;
        self.accumulator.update(who, old)?;
        self.stakes.insert(*who, new);
        self.total -= amount;
        Ok(())
    }

    /// Distribute over the current total stake.
    pub fn distribute(&mut self, amount: Amount) -> Result<(), AccrualError> {
        self.accumulator.distribute(amount, self.total).map(|_| ())
    }

    pub fn pending(&self, who: &Address) -> Result<Amount, AccrualError> {
        self.accumulator.query(who, self.stake_of(who))
    }

    pub fn withdraw(&mut self, who: &Address) -> Result<Amount, AccrualError> {
        let balance = self.stake_of(who);
        self.accumulator.withdraw(who, balance)
    }

    /// Withdraw for `who`, treating `NothingToClaim` as zero.
    pub fn withdraw_all(&mut self, who: &Address) -> Result<Amount, AccrualError> {
        match self.withdraw(who) {
            Ok(owed) => Ok(owed),
            Err(AccrualError::NothingToClaim) => Ok(0),
            Err(e) => Err(e),
        }
    }
}
