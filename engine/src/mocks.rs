//! Test fixtures: deterministic keypairs, configurations, and pre-funded
//! state for driving [`crate::Layer`] directly.

use crate::state::{Memory, State as _};
use commonware_cryptography::ed25519::{PrivateKey, PublicKey};
use commonware_cryptography::Signer as _;
use commonware_math::algebra::Random as _;
use fairroll_types::execution::{Key, Value, RANDOMNESS_LEN};
use fairroll_types::token::TokenAccount;
use fairroll_types::wager::{EngineConfig, PoolState};
use rand::{rngs::StdRng, SeedableRng};

/// Creates an account keypair for Ed25519 signatures used by participants.
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::random(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// A configuration with test-friendly bounds: tiny minimum bet, no wealth
/// tax by default, and instant-ish refund windows left to the caller.
pub fn test_config(oracle: PublicKey, sink: PublicKey) -> EngineConfig {
    let mut config = EngineConfig::new(oracle, sink);
    config.house_edge_bps = 100;
    config.wealth_tax_bps = 0;
    config.wealth_tax_threshold = 1_000_000_000;
    config.min_bet = 1;
    config.max_bet = 1_000_000_000;
    config.balance_max_profit_ratio = 10;
    config.reward_bps = 1_000;
    config.max_reward = 1_000_000;
    config.referral_fee_bps = 200;
    config.oracle_fee_reserve = 0;
    config.refund_delay_views = 10;
    config.yield_rate_per_view = 0;
    config.harvest_sink_bps = 1_000;
    config
}

/// Seed a fresh in-memory state with a configuration, a funded pool, and
/// funded participant accounts. Total issuance is kept consistent so
/// conservation audits hold from the first view.
pub async fn seed_state(
    config: EngineConfig,
    pool_balance: u64,
    balances: &[(PublicKey, u64)],
) -> Memory {
    let mut state = Memory::default();
    let mut total_issued = pool_balance;
    for (public, balance) in balances {
        total_issued += balance;
        state
            .insert(
                Key::TokenAccount(public.clone()),
                Value::TokenAccount(TokenAccount {
                    balance: *balance,
                    ..Default::default()
                }),
            )
            .await
            .expect("seed token account");
    }
    state
        .insert(
            Key::Pool,
            Value::Pool(PoolState {
                balance: pool_balance,
                total_issued,
                ..Default::default()
            }),
        )
        .await
        .expect("seed pool");
    state
        .insert(Key::Config, Value::Config(config))
        .await
        .expect("seed config");
    state
}

/// Randomness bytes whose big-endian value is exactly `value`, so the
/// settled outcome is `value % modulo`.
pub fn randomness_with_value(value: u64) -> [u8; RANDOMNESS_LEN] {
    let mut randomness = [0u8; RANDOMNESS_LEN];
    randomness[RANDOMNESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
    randomness
}
