//! Accumulator state storage interface and in-memory implementation.
//!
//! Provides the [`RewardStore`] trait for the reward-rate sum and per-participant
//! checkpoints. The [`MemoryRewardStore`] is suitable for testing and embedding;
//! the durable store uses RocksDB (accrue-store).
//!
//! Every record is namespaced by pool name so independent accumulators can
//! share one store without colliding.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::types::{Address, ParticipantState, Rscore};

/// Persistent accumulator state.
///
/// Reads of unknown keys return zero values. Writes overwrite.
///
/// Not thread-safe; callers should wrap in a `Mutex` (see
/// [`SharedAccumulator`](crate::shared::SharedAccumulator)) if concurrent
/// access is needed.
pub trait RewardStore: Send {
    /// Reward-rate sum of `pool`. Zero for a pool never distributed into.
    fn reward_rate_sum(&self, pool: &str) -> Result<Rscore, StoreError>;

    /// Overwrite the reward-rate sum of `pool`.
    fn set_reward_rate_sum(&mut self, pool: &str, value: Rscore) -> Result<(), StoreError>;

    /// Rscore decimals `pool` was created with, if it has been created.
    fn pool_decimals(&self, pool: &str) -> Result<Option<u8>, StoreError>;

    /// Record the rscore decimals of `pool`.
    fn set_pool_decimals(&mut self, pool: &str, decimals: u8) -> Result<(), StoreError>;

    /// Checkpoint of `address` in `pool`. Default (zero) if never written.
    fn participant(&self, pool: &str, address: &Address) -> Result<ParticipantState, StoreError>;

    /// Overwrite the checkpoint of `address` in `pool`.
    fn set_participant(
        &mut self,
        pool: &str,
        address: &Address,
        state: &ParticipantState,
    ) -> Result<(), StoreError>;
}

impl<S: RewardStore + ?Sized> RewardStore for Box<S> {
    fn reward_rate_sum(&self, pool: &str) -> Result<Rscore, StoreError> {
        (**self).reward_rate_sum(pool)
    }

    fn set_reward_rate_sum(&mut self, pool: &str, value: Rscore) -> Result<(), StoreError> {
        (**self).set_reward_rate_sum(pool, value)
    }

    fn pool_decimals(&self, pool: &str) -> Result<Option<u8>, StoreError> {
        (**self).pool_decimals(pool)
    }

    fn set_pool_decimals(&mut self, pool: &str, decimals: u8) -> Result<(), StoreError> {
        (**self).set_pool_decimals(pool, decimals)
    }

    fn participant(&self, pool: &str, address: &Address) -> Result<ParticipantState, StoreError> {
        (**self).participant(pool, address)
    }

    fn set_participant(
        &mut self,
        pool: &str,
        address: &Address,
        state: &ParticipantState,
    ) -> Result<(), StoreError> {
        (**self).set_participant(pool, address, state)
    }
}

/// In-memory accumulator storage.
///
/// Stores everything in `HashMap`s with no persistence.
#[derive(Debug, Default, Clone)]
pub struct MemoryRewardStore {
    /// Pool name → reward-rate sum.
    rates: HashMap<String, Rscore>,
    /// Pool name → rscore decimals.
    decimals: HashMap<String, u8>,
    /// (pool name, address) → checkpoint.
    participants: HashMap<(String, Address), ParticipantState>,
}

impl MemoryRewardStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of participant entries across all pools.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

impl RewardStore for MemoryRewardStore {
    fn reward_rate_sum(&self, pool: &str) -> Result<Rscore, StoreError> {
        Ok(self.rates.get(pool).copied().unwrap_or_default())
    }

    fn set_reward_rate_sum(&mut self, pool: &str, value: Rscore) -> Result<(), StoreError> {
        self.rates.insert(pool.to_string(), value);
        Ok(())
    }

    fn pool_decimals(&self, pool: &str) -> Result<Option<u8>, StoreError> {
        Ok(self.decimals.get(pool).copied())
    }

    fn set_pool_decimals(&mut self, pool: &str, decimals: u8) -> Result<(), StoreError> {
        self.decimals.insert(pool.to_string(), decimals);
        Ok(())
    }

    fn participant(&self, pool: &str, address: &Address) -> Result<ParticipantState, StoreError> {
        Ok(self
            .participants
            .get(&(pool.to_string(), *address))
            .copied()
            .unwrap_or_default())
    }

    fn set_participant(
        &mut self,
        pool: &str,
        address: &Address,
        state: &ParticipantState,
    ) -> Result<(), StoreError> {
        self.participants.insert((pool.to_string(), *address), *state);
        Ok(())
    }
}
