//! Risk and payout calculator.
//!
//! Pure functions over bet parameters and configuration; no state. All
//! intermediate math runs in `u128` with checked narrowing so payouts can
//! never silently wrap. Truncating division rounds every payout down,
//! in the operator's favor.

use fairroll_types::wager::{EngineConfig, BPS_DENOMINATOR, MAX_BET_MASK, MAX_MASK_MODULO, MAX_MODULO};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiskError {
    #[error("modulo out of range: {modulo} (allowed 2..={max})", max = MAX_MODULO)]
    InvalidModulo { modulo: u8 },
    #[error("win selector out of range: {selector}")]
    InvalidSelector { selector: u64 },
    #[error("win chance out of range: roll_under {roll_under} of modulo {modulo}")]
    WinChanceOutOfRange { roll_under: u8, modulo: u8 },
    #[error("fee consumes the entire stake ({total_bps} bps)")]
    FeeExceedsStake { total_bps: u64 },
    #[error("payout computation overflowed")]
    Overflow,
}

/// Derive the roll-under value that determines the win probability
/// (`roll_under / modulo`).
///
/// Small outcome spaces (`modulo <= 40`) encode the winning outcomes as a
/// bitmask and the roll-under is its exact population count; larger spaces
/// use the selector directly as a half-open "outcome < selector" threshold.
///
/// A bet that can never lose (`roll_under == modulo`) or never win is
/// rejected here, so downstream reward math can rely on
/// `0 < roll_under < modulo`.
pub fn roll_under(modulo: u8, win_selector: u64) -> Result<u8, RiskError> {
    if modulo < 2 || modulo > MAX_MODULO {
        return Err(RiskError::InvalidModulo { modulo });
    }
    let roll_under = if modulo <= MAX_MASK_MODULO {
        if win_selector == 0 || win_selector >= MAX_BET_MASK {
            return Err(RiskError::InvalidSelector {
                selector: win_selector,
            });
        }
        win_selector.count_ones() as u8
    } else {
        if win_selector == 0 || win_selector > modulo as u64 {
            return Err(RiskError::InvalidSelector {
                selector: win_selector,
            });
        }
        win_selector as u8
    };
    if roll_under == 0 || roll_under >= modulo {
        return Err(RiskError::WinChanceOutOfRange { roll_under, modulo });
    }
    Ok(roll_under)
}

/// Step-function wealth tax: zero below the threshold, one `wealth_tax_bps`
/// increment per whole multiple of `wealth_tax_threshold` staked.
pub fn effective_wealth_tax_bps(amount: u64, config: &EngineConfig) -> u64 {
    let steps = amount / config.wealth_tax_threshold;
    steps.saturating_mul(config.wealth_tax_bps as u64)
}

fn fee(amount: u64, config: &EngineConfig) -> Result<u64, RiskError> {
    let total_bps = (config.house_edge_bps as u64)
        .saturating_add(effective_wealth_tax_bps(amount, config));
    if total_bps >= BPS_DENOMINATOR {
        return Err(RiskError::FeeExceedsStake { total_bps });
    }
    let fee = (amount as u128) * (total_bps as u128) / (BPS_DENOMINATOR as u128);
    // total_bps < 10_000, so fee < amount and always fits.
    Ok(fee as u64)
}

/// Payout owed on a winning bet: the stake net of house edge and wealth
/// tax, scaled by the inverse win probability.
pub fn win_amount(
    amount: u64,
    modulo: u8,
    roll_under: u8,
    config: &EngineConfig,
) -> Result<u64, RiskError> {
    if roll_under == 0 || roll_under > modulo {
        return Err(RiskError::WinChanceOutOfRange { roll_under, modulo });
    }
    let fee = fee(amount, config)?;
    let win = ((amount - fee) as u128) * (modulo as u128) / (roll_under as u128);
    u64::try_from(win).map_err(|_| RiskError::Overflow)
}

/// Loyalty reward queued for a losing bet: a configured share of the fee,
/// scaled by the inverse loss probability and capped at `max_reward`.
///
/// Requires `roll_under < modulo`; placement validation guarantees it.
pub fn reward_amount(
    amount: u64,
    modulo: u8,
    roll_under: u8,
    config: &EngineConfig,
) -> Result<u64, RiskError> {
    if roll_under == 0 || roll_under >= modulo {
        return Err(RiskError::WinChanceOutOfRange { roll_under, modulo });
    }
    let fee = fee(amount, config)?;
    let scaled = (fee as u128) * (modulo as u128) / ((modulo - roll_under) as u128);
    let reward = scaled * (config.reward_bps as u128) / (BPS_DENOMINATOR as u128);
    Ok(reward.min(config.max_reward as u128) as u64)
}

/// Dynamic risk cap: the house never exposes more than a fixed fraction of
/// its live bankroll to a single bet. Recomputed on every read.
pub fn max_profit(pool_balance: u64, config: &EngineConfig) -> u64 {
    pool_balance / config.balance_max_profit_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer as _};
    use rand::{rngs::StdRng, Rng as _, SeedableRng as _};

    fn test_config() -> EngineConfig {
        let oracle = PrivateKey::from_seed(100).public_key();
        let sink = PrivateKey::from_seed(101).public_key();
        let mut config = EngineConfig::new(oracle, sink);
        config.house_edge_bps = 100;
        config.wealth_tax_bps = 0;
        config.wealth_tax_threshold = 1_000_000;
        config
    }

    fn naive_popcount(mask: u64) -> u8 {
        let mut count = 0u8;
        let mut mask = mask;
        while mask != 0 {
            count += (mask & 1) as u8;
            mask >>= 1;
        }
        count
    }

    #[test]
    fn roll_under_rejects_out_of_range_modulo() {
        assert!(matches!(
            roll_under(1, 1),
            Err(RiskError::InvalidModulo { modulo: 1 })
        ));
        assert!(matches!(
            roll_under(101, 50),
            Err(RiskError::InvalidModulo { modulo: 101 })
        ));
    }

    #[test]
    fn roll_under_rejects_out_of_range_selectors() {
        // Mask form: zero and >= 2^40 are invalid.
        assert!(matches!(
            roll_under(2, 0),
            Err(RiskError::InvalidSelector { .. })
        ));
        assert!(matches!(
            roll_under(40, 1 << 40),
            Err(RiskError::InvalidSelector { .. })
        ));
        // Threshold form: zero and > modulo are invalid.
        assert!(matches!(
            roll_under(100, 0),
            Err(RiskError::InvalidSelector { .. })
        ));
        assert!(matches!(
            roll_under(100, 101),
            Err(RiskError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn roll_under_rejects_bets_that_cannot_lose() {
        // Coin flip with both outcomes selected.
        assert!(matches!(
            roll_under(2, 0b11),
            Err(RiskError::WinChanceOutOfRange { .. })
        ));
        // Threshold equal to the full outcome space.
        assert!(matches!(
            roll_under(100, 100),
            Err(RiskError::WinChanceOutOfRange { .. })
        ));
    }

    #[test]
    fn roll_under_uses_exact_population_count() {
        // Spot checks against known masks.
        assert_eq!(roll_under(2, 0b10), Ok(1));
        assert_eq!(roll_under(6, 0b010101), Ok(3));
        assert_eq!(roll_under(36, (1 << 35) | 1), Ok(2));

        // Sampled masks across the full mask domain vs a naive reference.
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let mask = rng.gen_range(1..MAX_BET_MASK);
            let expected = naive_popcount(mask);
            match roll_under(40, mask) {
                Ok(got) => assert_eq!(got, expected, "mask {mask:#x}"),
                Err(RiskError::WinChanceOutOfRange { roll_under, .. }) => {
                    assert_eq!(roll_under, expected, "mask {mask:#x}");
                    assert!(expected == 0 || expected >= 40);
                }
                Err(err) => panic!("unexpected error for mask {mask:#x}: {err}"),
            }
        }
    }

    #[test]
    fn win_amount_matches_coin_flip_example() {
        // 10_000 staked on one side of a coin at 1% edge: (10_000 - 100) * 2.
        let config = test_config();
        assert_eq!(win_amount(10_000, 2, 1, &config), Ok(19_800));
    }

    #[test]
    fn win_amount_truncates_in_operator_favor() {
        let config = test_config();
        // fee = 1, (99 * 6) / 5 = 118.8 -> 118.
        let win = win_amount(100, 6, 5, &config).unwrap();
        assert_eq!(win, 118);
    }

    #[test]
    fn win_amount_is_monotonic_in_rates() {
        let mut config = test_config();
        let mut previous = u64::MAX;
        for edge in [0u16, 50, 100, 500, 1_000, 5_000] {
            config.house_edge_bps = edge;
            let win = win_amount(1_000_000, 36, 7, &config).unwrap();
            assert!(win <= previous, "edge {edge} increased payout");
            previous = win;
        }

        config.house_edge_bps = 100;
        config.wealth_tax_threshold = 100_000;
        let mut previous = u64::MAX;
        for tax in [0u16, 10, 50, 100] {
            config.wealth_tax_bps = tax;
            let win = win_amount(1_000_000, 36, 7, &config).unwrap();
            assert!(win <= previous, "tax {tax} increased payout");
            previous = win;
        }
    }

    #[test]
    fn win_amount_is_bounded_by_amount_times_modulo() {
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let amount = rng.gen_range(config.min_bet..=1_000_000_000);
            let modulo = rng.gen_range(2..=100u8);
            let roll_under = rng.gen_range(1..modulo);
            let win = win_amount(amount, modulo, roll_under, &config).unwrap();
            assert!(win as u128 <= amount as u128 * modulo as u128);
        }
    }

    #[test]
    fn wealth_tax_steps_with_stake_size() {
        let mut config = test_config();
        config.wealth_tax_bps = 50;
        config.wealth_tax_threshold = 1_000;
        assert_eq!(effective_wealth_tax_bps(999, &config), 0);
        assert_eq!(effective_wealth_tax_bps(1_000, &config), 50);
        assert_eq!(effective_wealth_tax_bps(2_500, &config), 100);
        assert_eq!(effective_wealth_tax_bps(10_000, &config), 500);
    }

    #[test]
    fn fee_rejects_confiscatory_rates() {
        let mut config = test_config();
        config.wealth_tax_bps = 5_000;
        config.wealth_tax_threshold = 1;
        assert!(matches!(
            win_amount(10, 2, 1, &config),
            Err(RiskError::FeeExceedsStake { .. })
        ));
    }

    #[test]
    fn reward_amount_caps_at_max_reward() {
        let mut config = test_config();
        config.reward_bps = 10_000;
        config.max_reward = 5;
        let reward = reward_amount(1_000_000, 2, 1, &config).unwrap();
        assert_eq!(reward, 5);
    }

    #[test]
    fn reward_amount_requires_a_losable_bet() {
        let config = test_config();
        assert!(matches!(
            reward_amount(1_000, 2, 2, &config),
            Err(RiskError::WinChanceOutOfRange { .. })
        ));
    }

    #[test]
    fn max_profit_tracks_pool_balance() {
        let mut config = test_config();
        config.balance_max_profit_ratio = 100;
        assert_eq!(max_profit(1_000_000, &config), 10_000);
        assert_eq!(max_profit(999, &config), 9);
        assert_eq!(max_profit(0, &config), 0);
    }
}
