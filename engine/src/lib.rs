//! Fairroll settlement engine.
//!
//! This crate contains the deterministic wager-settlement logic (`Layer`):
//! bet placement and exposure locking, oracle-driven outcome resolution,
//! timeout refunds, and the loyalty-reward/referral ledger.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; the only time-like input
//!   is the `view` supplied to [`Layer::new`].
//! - Do not use ambient randomness; random values enter exclusively through
//!   the oracle's `FulfillRandomness` callback.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Accounting invariants
//! - `PoolState::locked_in_bets` equals the sum of `possible_win_amount`
//!   over all open bets and never exceeds `PoolState::balance`.
//! - Each bet is settled or refunded at most once; `outcome` and
//!   `win_amount` are written exactly once.
//! - Sum of token balances + pool balance + reward-vault balance equals
//!   `PoolState::total_issued` after every transition.
//!
//! The primary entrypoint is [`Layer`].

pub mod guard;
pub mod risk;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use guard::{CallGuard, CallLock, LockHeld};
pub use layer::Layer;
pub use risk::{
    effective_wealth_tax_bps, max_profit, reward_amount, roll_under, win_amount, RiskError,
};
pub use state::{nonce, PrepareError, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
