//! # accrue-store: Durable state for accrue pools.
//!
//! - [`storage::RocksRewardStore`]: [`RewardStore`](accrue_core::RewardStore)
//!   backed by RocksDB, one database shared by any number of named pools
//! - [`ledger::RocksLedger`]: local payout ledger in the same database that
//!   can receive rewards by mint or by treasury transfer

pub mod ledger;
pub mod storage;

pub use ledger::RocksLedger;
pub use storage::RocksRewardStore;
