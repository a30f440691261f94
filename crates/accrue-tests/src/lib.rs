//! Integration test suite for accrue.
//!
//! Exercises the accumulator the way a host uses it: a simulated staking
//! ledger that checkpoints before every balance change, randomized
//! interleavings of stakes and distributions, and concurrent access.

pub mod helpers;
