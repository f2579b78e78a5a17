//! Wager domain types: bets, pool accounting, rewards, configuration.

mod bet;
mod codec;
mod config;
mod constants;
mod pool;
mod rewards;

pub use bet::Bet;
pub use codec::{read_string, string_encode_size, write_string};
pub use config::{ConfigError, EngineConfig};
pub use constants::*;
pub use pool::PoolState;
pub use rewards::{RewardAccount, RewardVault};

#[cfg(test)]
mod tests;
