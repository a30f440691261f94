//! Serialized access to an accumulator from concurrent callers.
//!
//! Each call takes one lock over the whole accumulator, which covers both the
//! pool's reward-rate sum and every participant entry. [`SharedAccumulator::with`]
//! holds the lock across several steps, e.g. a checkpoint followed by the
//! host's own balance change.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::accumulator::RewardAccumulator;
use crate::error::AccrualError;
use crate::store::RewardStore;
use crate::types::{Address, Amount, ParticipantState, Rscore};

/// Cloneable handle to a mutex-guarded accumulator.
pub struct SharedAccumulator<S> {
    inner: Arc<Mutex<RewardAccumulator<S>>>,
}

impl<S> Clone for SharedAccumulator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RewardStore> SharedAccumulator<S> {
    pub fn new(accumulator: RewardAccumulator<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(accumulator)),
        }
    }

    /// Run `f` with exclusive access to the accumulator.
    pub fn with<R>(&self, f: impl FnOnce(&mut RewardAccumulator<S>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn distribute(
        &self,
        amount: Amount,
        total_eligible_supply: Amount,
    ) -> Result<Rscore, AccrualError> {
        self.inner.lock().distribute(amount, total_eligible_supply)
    }

    pub fn update(&self, address: &Address, balance: Amount) -> Result<(), AccrualError> {
        self.inner.lock().update(address, balance)
    }

    pub fn query(&self, address: &Address, balance: Amount) -> Result<Amount, AccrualError> {
        self.inner.lock().query(address, balance)
    }

    pub fn withdraw(&self, address: &Address, balance: Amount) -> Result<Amount, AccrualError> {
        self.inner.lock().withdraw(address, balance)
    }

    pub fn reward_rate_sum(&self) -> Result<Rscore, AccrualError> {
        self.inner.lock().reward_rate_sum()
    }

    pub fn participant(&self, address: &Address) -> Result<ParticipantState, AccrualError> {
        self.inner.lock().participant(address)
    }

    /// Unwrap the accumulator if this is the last handle.
    pub fn try_unwrap(self) -> Result<RewardAccumulator<S>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRewardStore;
    use crate::units::Precision;
    use std::thread;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn shared() -> SharedAccumulator<MemoryRewardStore> {
        let acc =
            RewardAccumulator::new("rewards", Precision::default(), MemoryRewardStore::new())
                .unwrap();
        SharedAccumulator::new(acc)
    }

    #[test]
    fn clones_share_state() {
        let a = shared();
        let b = a.clone();
        a.distribute(E18, E18).unwrap();
        assert_eq!(b.reward_rate_sum().unwrap(), Rscore::from(E18));
    }

    #[test]
    fn concurrent_distributions_all_land() {
        let acc = shared();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let acc = acc.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        acc.distribute(1, 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // 800 distributions of one unit over one unit of supply
        assert_eq!(acc.query(&Address([1; 32]), 1).unwrap(), 800);
    }

    #[test]
    fn with_holds_lock_across_steps() {
        let acc = shared();
        acc.distribute(10 * E18, 10).unwrap();
        let owed = acc.with(|a| {
            a.update(&Address([1; 32]), 10)?;
            a.withdraw(&Address([1; 32]), 0)
        });
        assert_eq!(owed.unwrap(), 10 * E18);
    }

    #[test]
    fn try_unwrap_last_handle() {
        let acc = shared();
        let other = acc.clone();
        let acc = acc.try_unwrap().unwrap_err();
        drop(other);
        assert!(acc.try_unwrap().is_ok());
    }
}
