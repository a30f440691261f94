//! Claiming on behalf of participants.
//!
//! [`RewardHandler`] pairs an accumulator with the delivery mechanism the host
//! chose at construction. A claim withdraws and then delivers exactly once; a
//! delivery failure restores the participant's checkpoint so nothing is lost.

use tracing::{info, warn};

use crate::accumulator::RewardAccumulator;
use crate::delivery::RewardDelivery;
use crate::error::{AccrualError, ClaimError};
use crate::store::RewardStore;
use crate::types::{Address, Amount, Rscore};

/// Accumulator plus delivery.
pub struct RewardHandler<S, D> {
    accumulator: RewardAccumulator<S>,
    delivery: D,
}

impl<S: RewardStore, D: RewardDelivery> RewardHandler<S, D> {
    pub fn new(accumulator: RewardAccumulator<S>, delivery: D) -> Self {
        Self {
            accumulator,
            delivery,
        }
    }

    pub fn accumulator(&self) -> &RewardAccumulator<S> {
        &self.accumulator
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn into_parts(self) -> (RewardAccumulator<S>, D) {
        (self.accumulator, self.delivery)
    }

    /// See [`RewardAccumulator::distribute`].
    pub fn distribute(
        &mut self,
        amount: Amount,
        total_eligible_supply: Amount,
    ) -> Result<Rscore, AccrualError> {
        self.accumulator.distribute(amount, total_eligible_supply)
    }

    /// See [`RewardAccumulator::update`].
    pub fn update(&mut self, address: &Address, balance: Amount) -> Result<(), AccrualError> {
        self.accumulator.update(address, balance)
    }

    /// See [`RewardAccumulator::query`].
    pub fn query(&self, address: &Address, balance: Amount) -> Result<Amount, AccrualError> {
        self.accumulator.query(address, balance)
    }

    /// Withdraw everything owed to `address` and deliver it.
    ///
    /// # Errors
    ///
    /// - [`ClaimError::Accrual`] from the withdrawal (e.g. `NothingToClaim`)
    /// - [`ClaimError::Delivery`] if delivery failed; the checkpoint is restored
    ///
    /// The withdrawal and the delivery are separate writes. A crash between
    /// them leaves the withdrawal recorded without the payout.
    pub fn claim(&mut self, address: &Address, balance: Amount) -> Result<Amount, ClaimError> {
        let snapshot = self.accumulator.participant(address)?;
        let owed = self.accumulator.withdraw(address, balance)?;

        if let Err(e) = self.delivery.deliver(address, owed) {
            warn!(
                pool = %self.accumulator.name(),
                %address,
                owed = %owed,
                error = %e,
                "delivery failed, reverting withdrawal"
            );
            if let Err(restore) = self.accumulator.restore_participant(address, &snapshot) {
                warn!(
                    pool = %self.accumulator.name(),
                    %address,
                    error = %restore,
                    "failed to restore checkpoint after delivery failure"
                );
            }
            return Err(e.into());
        }

        info!(pool = %self.accumulator.name(), %address, amount = %owed, "claimed");
        Ok(owed)
    }
}
