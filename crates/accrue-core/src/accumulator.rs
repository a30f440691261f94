//! The reward-rate accumulator.
//!
//! A distribution of `amount` over `total_eligible_supply` raises the pool's
//! reward-rate sum by `floor(amount * 10^precision / total_eligible_supply)`.
//! A participant holding `balance` since its last checkpoint is owed
//! `balance * (reward_rate_sum - entry_rate)` on top of what was already
//! folded into `accrued`. Nothing ever iterates over participants.
//!
//! The host must call [`RewardAccumulator::update`] with the *old* balance
//! immediately before changing a participant's eligible balance. The
//! accumulator does not own balances and cannot detect a missed checkpoint.
//!
//! Every operation reads what it needs, computes the new state in memory and
//! writes it back only on success, so a failed call leaves the store untouched.

use tracing::debug;

use crate::constants::MAX_POOL_NAME_LEN;
use crate::error::AccrualError;
use crate::store::RewardStore;
use crate::types::{Address, Amount, ParticipantState, Rscore};
use crate::units::Precision;

/// Reward accrual for one named pool.
///
/// Owns its store; the pool name namespaces every record it writes, so
/// several accumulators may persist into the same backing database.
#[derive(Debug)]
pub struct RewardAccumulator<S> {
    name: String,
    precision: Precision,
    store: S,
}

/// Rscore earned by `balance` while the rate moved from `entry_rate` to `rate`.
fn pending_rscore(balance: Amount, rate: Rscore, entry_rate: Rscore) -> Result<Rscore, AccrualError> {
    let rate_delta = rate.checked_sub(entry_rate).ok_or_else(|| {
        AccrualError::InvalidState(format!(
            "entry rate {entry_rate} ahead of reward rate sum {rate}"
        ))
    })?;
    Rscore::from(balance)
        .checked_mul(rate_delta)
        .ok_or(AccrualError::Overflow)
}

/// Fold pending reward into `state` and move its entry rate to `rate`.
fn checkpoint(
    state: ParticipantState,
    rate: Rscore,
    balance: Amount,
) -> Result<ParticipantState, AccrualError> {
    let pending = pending_rscore(balance, rate, state.entry_rate)?;
    let accrued = state
        .accrued
        .checked_add(pending)
        .ok_or(AccrualError::Overflow)?;
    Ok(ParticipantState {
        entry_rate: rate,
        accrued,
    })
}

impl<S: RewardStore> RewardAccumulator<S> {
    /// Create an accumulator for pool `name` backed by `store`.
    ///
    /// State already present in `store` under `name` is picked up as-is. A
    /// pool keeps the precision it was first opened with; a new pool records
    /// `precision` in the store.
    ///
    /// # Errors
    ///
    /// - [`AccrualError::InvalidPoolName`] if `name` is empty or longer than
    ///   [`MAX_POOL_NAME_LEN`] bytes
    /// - [`AccrualError::PrecisionMismatch`] if the pool was created with
    ///   different decimals
    pub fn new(
        name: impl Into<String>,
        precision: Precision,
        mut store: S,
    ) -> Result<Self, AccrualError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AccrualError::InvalidPoolName("empty".into()));
        }
        if name.len() > MAX_POOL_NAME_LEN {
            return Err(AccrualError::InvalidPoolName(format!(
                "{} bytes exceeds {MAX_POOL_NAME_LEN}",
                name.len()
            )));
        }
        match store.pool_decimals(&name)? {
            Some(stored) if stored != precision.decimals() => {
                return Err(AccrualError::PrecisionMismatch {
                    pool: name,
                    stored,
                    requested: precision.decimals(),
                });
            }
            Some(_) => {}
            None => store.set_pool_decimals(&name, precision.decimals())?,
        }
        Ok(Self {
            name,
            precision,
            store,
        })
    }

    /// Pool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scaling between external amounts and rscore.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the accumulator, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Current reward-rate sum, in rscore per unit of eligible balance.
    pub fn reward_rate_sum(&self) -> Result<Rscore, AccrualError> {
        Ok(self.store.reward_rate_sum(&self.name)?)
    }

    /// Stored checkpoint of `address` (default zero).
    pub fn participant(&self, address: &Address) -> Result<ParticipantState, AccrualError> {
        Ok(self.store.participant(&self.name, address)?)
    }

    /// Distribute `amount` across `total_eligible_supply` units of eligible balance.
    ///
    /// Returns the increase of the reward-rate sum. The remainder of the floor
    /// division is dropped.
    ///
    /// # Errors
    ///
    /// - [`AccrualError::InvalidState`] if `total_eligible_supply` is zero
    /// - [`AccrualError::Overflow`] if the rate sum would exceed 256 bits
    pub fn distribute(
        &mut self,
        amount: Amount,
        total_eligible_supply: Amount,
    ) -> Result<Rscore, AccrualError> {
        if total_eligible_supply == 0 {
            return Err(AccrualError::InvalidState(
                "total eligible supply is zero".into(),
            ));
        }

        let increment = self.precision.to_rscore(amount)? / Rscore::from(total_eligible_supply);
        let rate = self.reward_rate_sum()?;
        let new_rate = rate.checked_add(increment).ok_or(AccrualError::Overflow)?;
        if increment > Rscore::ZERO {
            self.store.set_reward_rate_sum(&self.name, new_rate)?;
        }

        debug!(
            pool = %self.name,
            amount = %amount,
            total_eligible_supply = %total_eligible_supply,
            %increment,
            reward_rate_sum = %new_rate,
            "distribute"
        );
        Ok(increment)
    }

    /// Checkpoint `address` against the balance it has held since its last checkpoint.
    ///
    /// Call this before every change to the participant's eligible balance,
    /// passing the balance as it was *before* the change.
    pub fn update(&mut self, address: &Address, balance: Amount) -> Result<(), AccrualError> {
        let rate = self.reward_rate_sum()?;
        let before = self.participant(address)?;
        let after = checkpoint(before, rate, balance)?;
        if after != before {
            self.store.set_participant(&self.name, address, &after)?;
        }

        debug!(
            pool = %self.name,
            %address,
            balance = %balance,
            accrued = %after.accrued,
            entry_rate = %after.entry_rate,
            "checkpoint"
        );
        Ok(())
    }

    /// Amount [`withdraw`](Self::withdraw) would return for `balance`, without mutating state.
    pub fn query(&self, address: &Address, balance: Amount) -> Result<Amount, AccrualError> {
        let rate = self.reward_rate_sum()?;
        let state = self.participant(address)?;
        let total = pending_rscore(balance, rate, state.entry_rate)?
            .checked_add(state.accrued)
            .ok_or(AccrualError::Overflow)?;
        self.precision.to_amount(total)
    }

    /// Checkpoint `address`, then take every whole external unit it has accrued.
    ///
    /// The caller must deliver the returned amount to the participant; the
    /// accumulator moves no value. The sub-unit remainder stays in `accrued`.
    ///
    /// # Errors
    ///
    /// [`AccrualError::NothingToClaim`] if less than one unit is owed. The
    /// checkpoint is not persisted in that case.
    pub fn withdraw(&mut self, address: &Address, balance: Amount) -> Result<Amount, AccrualError> {
        let rate = self.reward_rate_sum()?;
        let mut state = checkpoint(self.participant(address)?, rate, balance)?;

        let owed = self.precision.to_amount(state.accrued)?;
        if owed == 0 {
            return Err(AccrualError::NothingToClaim);
        }

        // owed * factor <= accrued by construction of the floor division
        state.accrued = state
            .accrued
            .checked_sub(self.precision.to_rscore(owed)?)
            .ok_or(AccrualError::Overflow)?;
        self.store.set_participant(&self.name, address, &state)?;

        debug!(
            pool = %self.name,
            %address,
            balance = %balance,
            owed = %owed,
            remainder = %state.accrued,
            "withdraw"
        );
        Ok(owed)
    }

    /// Overwrite the checkpoint of `address`. Used to revert a withdrawal
    /// whose delivery failed.
    pub(crate) fn restore_participant(
        &mut self,
        address: &Address,
        state: &ParticipantState,
    ) -> Result<(), AccrualError> {
        Ok(self.store.set_participant(&self.name, address, state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_POOL_NAME;
    use crate::store::MemoryRewardStore;
    use proptest::prelude::*;

    const E16: u128 = 10_000_000_000_000_000;
    const E19: u128 = 10_000_000_000_000_000_000;
    const E21: u128 = 1_000_000_000_000_000_000_000;
    const E23: u128 = 100_000_000_000_000_000_000_000;

    fn addr(seed: u8) -> Address {
        Address([seed; 32])
    }

    fn accumulator() -> RewardAccumulator<MemoryRewardStore> {
        RewardAccumulator::new(DEFAULT_POOL_NAME, Precision::default(), MemoryRewardStore::new())
            .unwrap()
    }

    fn small_accumulator() -> RewardAccumulator<MemoryRewardStore> {
        RewardAccumulator::new("small", Precision::new(2).unwrap(), MemoryRewardStore::new())
            .unwrap()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    #[test]
    fn rejects_empty_pool_name() {
        let err = RewardAccumulator::new("", Precision::default(), MemoryRewardStore::new())
            .unwrap_err();
        assert!(matches!(err, AccrualError::InvalidPoolName(_)));
    }

    #[test]
    fn rejects_oversized_pool_name() {
        let name = "x".repeat(MAX_POOL_NAME_LEN + 1);
        let err = RewardAccumulator::new(name, Precision::default(), MemoryRewardStore::new())
            .unwrap_err();
        assert!(matches!(err, AccrualError::InvalidPoolName(_)));
    }

    #[test]
    fn new_pool_records_its_decimals() {
        let acc = small_accumulator();
        assert_eq!(acc.store().pool_decimals("small").unwrap(), Some(2));
    }

    #[test]
    fn reopening_with_other_decimals_is_rejected() {
        let mut acc = accumulator();
        acc.distribute(1_000, 1_000).unwrap();
        let store = acc.into_store();

        let six = Precision::new(6).unwrap();
        let err = RewardAccumulator::new(DEFAULT_POOL_NAME, six, store.clone()).unwrap_err();
        assert_eq!(
            err,
            AccrualError::PrecisionMismatch {
                pool: DEFAULT_POOL_NAME.to_string(),
                stored: 18,
                requested: 6,
            }
        );
        assert_eq!(store.pool_decimals(DEFAULT_POOL_NAME).unwrap(), Some(18));

        let acc = RewardAccumulator::new(DEFAULT_POOL_NAME, Precision::default(), store).unwrap();
        assert_eq!(acc.query(&addr(1), 1).unwrap(), 1);
    }

    #[test]
    fn pools_in_one_store_keep_their_own_decimals() {
        let acc = small_accumulator();
        let store = acc.into_store();
        let acc = RewardAccumulator::new("other", Precision::new(6).unwrap(), store).unwrap();
        assert_eq!(acc.store().pool_decimals("small").unwrap(), Some(2));
        assert_eq!(acc.store().pool_decimals("other").unwrap(), Some(6));
    }

    #[test]
    fn fresh_pool_is_zero() {
        let acc = accumulator();
        assert_eq!(acc.name(), DEFAULT_POOL_NAME);
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::ZERO);
        assert!(acc.participant(&addr(1)).unwrap().is_empty());
        assert_eq!(acc.query(&addr(1), E21).unwrap(), 0);
    }

    // ------------------------------------------------------------------
    // distribute
    // ------------------------------------------------------------------

    #[test]
    fn distribute_raises_rate_by_scaled_share() {
        let mut acc = accumulator();
        let inc = acc.distribute(E21, E23).unwrap();
        assert_eq!(inc, Rscore::from(E16));
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::from(E16));
    }

    #[test]
    fn distribute_zero_supply_is_invalid_state() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        let err = acc.distribute(E21, 0).unwrap_err();
        assert!(matches!(err, AccrualError::InvalidState(_)));
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::from(E16));
    }

    #[test]
    fn distribute_zero_amount_keeps_rate() {
        let mut acc = accumulator();
        assert_eq!(acc.distribute(0, E23).unwrap(), Rscore::ZERO);
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::ZERO);
    }

    #[test]
    fn distribute_drops_remainder_dust() {
        // 1 unit at 2 decimals = 100 rscore; 100 / 3 = 33, 1 rscore of dust
        let mut acc = small_accumulator();
        assert_eq!(acc.distribute(1, 3).unwrap(), Rscore::from(33u8));
    }

    #[test]
    fn distribute_overflow_leaves_rate_unchanged() {
        let mut acc = RewardAccumulator::new(
            "max",
            Precision::new(38).unwrap(),
            MemoryRewardStore::new(),
        )
        .unwrap();
        // Each call adds ~3.4e76, so the fourth must overflow 2^256 (~1.16e77).
        for _ in 0..3 {
            acc.distribute(u128::MAX, 1).unwrap();
        }
        let rate = acc.reward_rate_sum().unwrap();
        assert_eq!(acc.distribute(u128::MAX, 1), Err(AccrualError::Overflow));
        assert_eq!(acc.reward_rate_sum().unwrap(), rate);
    }

    // ------------------------------------------------------------------
    // Overflow in checkpoint, query and withdraw
    // ------------------------------------------------------------------

    /// Precision 38 with one distribution of `u128::MAX` over a single unit:
    /// the rate is ~3.4e76, so any large balance overflows 256 bits.
    fn saturated_accumulator() -> RewardAccumulator<MemoryRewardStore> {
        let mut acc =
            RewardAccumulator::new("max", Precision::new(38).unwrap(), MemoryRewardStore::new())
                .unwrap();
        acc.distribute(u128::MAX, 1).unwrap();
        acc
    }

    /// Precision 0 with a rate of `u128::MAX`: two units of balance accrue
    /// more than `u128::MAX` whole units.
    fn oversized_claim_accumulator() -> RewardAccumulator<MemoryRewardStore> {
        let mut acc =
            RewardAccumulator::new("wide", Precision::new(0).unwrap(), MemoryRewardStore::new())
                .unwrap();
        acc.distribute(u128::MAX, 1).unwrap();
        acc.update(&addr(1), 2).unwrap();
        acc
    }

    #[test]
    fn update_overflow_leaves_participant_unchanged() {
        let mut acc = saturated_accumulator();
        let before = acc.participant(&addr(1)).unwrap();
        assert_eq!(acc.update(&addr(1), u128::MAX), Err(AccrualError::Overflow));
        assert_eq!(acc.participant(&addr(1)).unwrap(), before);
    }

    #[test]
    fn query_overflow_is_reported() {
        let acc = saturated_accumulator();
        assert_eq!(acc.query(&addr(1), u128::MAX), Err(AccrualError::Overflow));
        assert!(acc.participant(&addr(1)).unwrap().is_empty());
    }

    #[test]
    fn withdraw_overflow_in_checkpoint_leaves_participant_unchanged() {
        let mut acc = saturated_accumulator();
        assert_eq!(acc.withdraw(&addr(1), u128::MAX), Err(AccrualError::Overflow));
        assert!(acc.participant(&addr(1)).unwrap().is_empty());
    }

    #[test]
    fn withdraw_owed_beyond_u128_is_overflow() {
        let mut acc = oversized_claim_accumulator();
        let before = acc.participant(&addr(1)).unwrap();
        assert_eq!(before.accrued, Rscore::from(u128::MAX) * Rscore::from(2u8));

        assert_eq!(acc.withdraw(&addr(1), 0), Err(AccrualError::Overflow));
        assert_eq!(acc.participant(&addr(1)).unwrap(), before);
        assert_eq!(acc.query(&addr(1), 0), Err(AccrualError::Overflow));
    }

    // ------------------------------------------------------------------
    // update
    // ------------------------------------------------------------------

    #[test]
    fn update_folds_pending_into_accrued() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        acc.update(&addr(1), E21).unwrap();
        let state = acc.participant(&addr(1)).unwrap();
        assert_eq!(state.entry_rate, Rscore::from(E16));
        assert_eq!(state.accrued, Rscore::from(E21) * Rscore::from(E16));
    }

    #[test]
    fn update_is_idempotent() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        acc.update(&addr(1), E21).unwrap();
        let first = acc.participant(&addr(1)).unwrap();
        acc.update(&addr(1), E21).unwrap();
        assert_eq!(acc.participant(&addr(1)).unwrap(), first);
    }

    #[test]
    fn update_does_not_change_query() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        let before = acc.query(&addr(1), E21).unwrap();
        acc.update(&addr(1), E21).unwrap();
        assert_eq!(acc.query(&addr(1), E21).unwrap(), before);
    }

    #[test]
    fn update_with_zero_balance_only_moves_entry_rate() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        acc.update(&addr(1), 0).unwrap();
        let state = acc.participant(&addr(1)).unwrap();
        assert_eq!(state.entry_rate, Rscore::from(E16));
        assert_eq!(state.accrued, Rscore::ZERO);
    }

    #[test]
    fn new_participant_earns_nothing_from_past_distributions() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        // joins with zero balance, then receives stake
        acc.update(&addr(2), 0).unwrap();
        assert_eq!(acc.query(&addr(2), E21).unwrap(), 0);
        acc.distribute(E21, E23).unwrap();
        assert_eq!(acc.query(&addr(2), E21).unwrap(), E19);
    }

    #[test]
    fn balance_change_after_checkpoint_applies_forward_only() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap(); // rate 1e16
        acc.update(&addr(1), E21).unwrap(); // earned 1e19 at the old balance
        let doubled = 2 * E21;
        acc.distribute(E21, E23).unwrap(); // rate 2e16
        // 1e19 accrued + 2e21 * 1e16 / 1e18 = 1e19 + 2e19
        assert_eq!(acc.query(&addr(1), doubled).unwrap(), 3 * E19);
    }

    #[test]
    fn entry_rate_ahead_of_rate_is_invalid_state() {
        let mut acc = accumulator();
        let corrupt = ParticipantState {
            entry_rate: Rscore::from(5u8),
            accrued: Rscore::ZERO,
        };
        acc.restore_participant(&addr(1), &corrupt).unwrap();
        assert!(matches!(
            acc.query(&addr(1), 1),
            Err(AccrualError::InvalidState(_))
        ));
        assert!(matches!(
            acc.update(&addr(1), 1),
            Err(AccrualError::InvalidState(_))
        ));
    }

    // ------------------------------------------------------------------
    // withdraw
    // ------------------------------------------------------------------

    #[test]
    fn withdraw_returns_query_and_zeroes_it() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        let expected = acc.query(&addr(1), E21).unwrap();
        assert_eq!(acc.withdraw(&addr(1), E21).unwrap(), expected);
        assert_eq!(acc.query(&addr(1), E21).unwrap(), 0);
    }

    #[test]
    fn withdraw_nothing_is_rejected() {
        let mut acc = accumulator();
        assert_eq!(acc.withdraw(&addr(1), E21), Err(AccrualError::NothingToClaim));
        acc.distribute(E21, E23).unwrap();
        assert_eq!(acc.withdraw(&addr(1), 0), Err(AccrualError::NothingToClaim));
    }

    #[test]
    fn withdraw_rejection_does_not_persist_checkpoint() {
        // 1 unit over supply 3 at 2 decimals: rate 33, balance 1 accrues 33 rscore < 1 unit
        let mut acc = small_accumulator();
        acc.distribute(1, 3).unwrap();
        assert_eq!(acc.withdraw(&addr(1), 1), Err(AccrualError::NothingToClaim));
        assert!(acc.participant(&addr(1)).unwrap().is_empty());
    }

    #[test]
    fn withdraw_keeps_sub_unit_remainder() {
        let mut acc = small_accumulator();
        acc.distribute(1, 3).unwrap(); // rate 33
        acc.distribute(1, 3).unwrap(); // rate 66
        acc.distribute(1, 3).unwrap(); // rate 99
        acc.distribute(1, 3).unwrap(); // rate 132
        // balance 1: 132 rscore = 1 unit + 32 remainder
        assert_eq!(acc.withdraw(&addr(1), 1).unwrap(), 1);
        let state = acc.participant(&addr(1)).unwrap();
        assert_eq!(state.accrued, Rscore::from(32u8));
        assert_eq!(state.entry_rate, Rscore::from(132u8));

        // The remainder counts towards the next unit.
        acc.distribute(1, 3).unwrap();
        acc.distribute(1, 3).unwrap(); // rate 198, pending 66, total 98
        assert_eq!(acc.query(&addr(1), 1).unwrap(), 0);
        acc.distribute(1, 3).unwrap(); // pending 99, total 131
        assert_eq!(acc.withdraw(&addr(1), 1).unwrap(), 1);
        assert_eq!(acc.participant(&addr(1)).unwrap().accrued, Rscore::from(31u8));
    }

    #[test]
    fn withdraw_after_balance_drop_pays_accrued() {
        let mut acc = accumulator();
        acc.distribute(E21, E23).unwrap();
        acc.update(&addr(1), E21).unwrap();
        // fully unstaked: balance is now zero, accrued reward remains claimable
        assert_eq!(acc.withdraw(&addr(1), 0).unwrap(), E19);
        assert_eq!(acc.withdraw(&addr(1), 0), Err(AccrualError::NothingToClaim));
    }

    // ------------------------------------------------------------------
    // Scenario
    // ------------------------------------------------------------------

    #[test]
    fn two_distributions_then_withdraw() {
        let mut acc = accumulator();
        let p = addr(7);

        acc.distribute(E21, E23).unwrap();
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::from(E16));
        assert_eq!(acc.query(&p, E21).unwrap(), E19);

        acc.distribute(E21, E23).unwrap();
        assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::from(2 * E16));
        assert_eq!(acc.query(&p, E21).unwrap(), 2 * E19);

        acc.update(&p, E21).unwrap();
        assert_eq!(acc.query(&p, E21).unwrap(), 2 * E19);

        assert_eq!(acc.withdraw(&p, E21).unwrap(), 2 * E19);
        assert_eq!(acc.query(&p, E21).unwrap(), 0);
    }

    #[test]
    fn pools_in_one_store_are_independent() {
        let store = MemoryRewardStore::new();
        let mut a = RewardAccumulator::new("a", Precision::default(), store).unwrap();
        a.distribute(E21, E23).unwrap();
        let store = a.into_store();
        let b = RewardAccumulator::new("b", Precision::default(), store).unwrap();
        assert_eq!(b.reward_rate_sum().unwrap(), Rscore::ZERO);
        assert_eq!(b.query(&addr(1), E21).unwrap(), 0);
        let a = RewardAccumulator::new("a", Precision::default(), b.into_store()).unwrap();
        assert_eq!(a.query(&addr(1), E21).unwrap(), E19);
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    proptest! {
        #[test]
        fn rate_monotonic(ops in prop::collection::vec((0u128..=E21, 0u128..=E23), 1..32)) {
            let mut acc = accumulator();
            let mut prev = Rscore::ZERO;
            for (amount, supply) in ops {
                let _ = acc.distribute(amount, supply);
                let rate = acc.reward_rate_sum().unwrap();
                prop_assert!(rate >= prev);
                prev = rate;
            }
        }

        #[test]
        fn zero_supply_always_rejected(amount in any::<u128>()) {
            let mut acc = accumulator();
            acc.distribute(E21, E23).unwrap();
            let err = acc.distribute(amount, 0).unwrap_err();
            prop_assert!(matches!(err, AccrualError::InvalidState(_)));
            prop_assert_eq!(acc.reward_rate_sum().unwrap(), Rscore::from(E16));
        }

        #[test]
        fn query_matches_withdraw(
            amounts in prop::collection::vec(1u128..=E21, 1..8),
            supply in 1u128..=E23,
            balance_frac in 0u128..=100,
        ) {
            let mut acc = accumulator();
            let balance = supply * balance_frac / 100;
            for amount in amounts {
                acc.distribute(amount, supply).unwrap();
            }
            let q = acc.query(&addr(1), balance).unwrap();
            match acc.withdraw(&addr(1), balance) {
                Ok(w) => prop_assert_eq!(w, q),
                Err(e) => {
                    prop_assert_eq!(e, AccrualError::NothingToClaim);
                    prop_assert_eq!(q, 0);
                }
            }
            prop_assert_eq!(acc.query(&addr(1), balance).unwrap(), 0);
        }

        #[test]
        fn halves_distribute_like_whole(
            half in 0u128..=E21,
            supply in 1u128..=E23,
            balance_frac in 0u128..=100,
        ) {
            let amount = half * 2;
            let balance = supply * balance_frac / 100;

            let mut once = accumulator();
            once.distribute(amount, supply).unwrap();
            let mut twice = accumulator();
            twice.distribute(half, supply).unwrap();
            twice.distribute(half, supply).unwrap();

            let q1 = once.query(&addr(1), balance).unwrap();
            let q2 = twice.query(&addr(1), balance).unwrap();
            // floor(2x) - 2*floor(x) is 0 or 1 rscore per unit of balance
            let factor = 10u128.pow(18);
            prop_assert!(q1 >= q2);
            prop_assert!(q1 - q2 <= balance / factor + 1);
        }
    }
}
