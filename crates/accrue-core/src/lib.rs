//! # accrue-core: Lazy O(1) reward accrual.
//!
//! All calculations use checked integer arithmetic only for determinism.
//!
//! A pool of value is distributed across participants whose eligible balances
//! change over time, without ever iterating over the participant set:
//! - **Reward-rate sum**: cumulative reward per unit of eligible balance, in a
//!   high-precision internal unit (rscore). Only [`RewardAccumulator::distribute`]
//!   moves it, and only upwards.
//! - **Checkpoints**: each participant stores the rate it last saw plus the
//!   reward folded in so far. Anything newer is derived on demand from the
//!   rate difference and the balance the host supplies.
//! - **Delivery**: withdrawing only computes what is owed. Moving value is the
//!   job of a [`RewardDelivery`] implementation injected by the host.

pub mod accumulator;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod handler;
pub mod shared;
pub mod store;
pub mod types;
pub mod units;

pub use accumulator::RewardAccumulator;
pub use delivery::{DeliveryKind, MintDelivery, RewardDelivery, TransferDelivery};
pub use error::{AccrualError, ClaimError, DeliveryError, StoreError};
pub use handler::RewardHandler;
pub use shared::SharedAccumulator;
pub use store::{MemoryRewardStore, RewardStore};
pub use types::{Address, Amount, ParticipantState, Rscore};
pub use units::Precision;
