use super::*;
use crate::execution::{Event, Instruction, Key, Value};
use bytes::BytesMut;
use commonware_codec::{DecodeExt as _, Write};
use commonware_cryptography::{ed25519::PrivateKey, Signer as _};

fn key(seed: u64) -> commonware_cryptography::ed25519::PublicKey {
    PrivateKey::from_seed(seed).public_key()
}

macro_rules! roundtrip {
    ($value:expr, $ty:ty) => {{
        let mut buf = BytesMut::new();
        $value.write(&mut buf);
        <$ty>::decode(buf.as_ref()).expect("decode")
    }};
}

#[test]
fn bet_roundtrips_through_codec() {
    let bet = Bet {
        participant: key(1),
        amount: 5_000,
        modulo: 6,
        win_selector: 0b101010,
        placement_view: 77,
        possible_win_amount: 9_800,
        is_settled: true,
        outcome: 3,
        win_amount: 9_800,
    };
    assert_eq!(roundtrip!(&bet, Bet), bet);
}

#[test]
fn reward_account_roundtrips_with_and_without_referrer() {
    let with_referrer = RewardAccount {
        pending: 123,
        referrer: Some(key(2)),
        referred_count: 4,
        registered: true,
    };
    assert_eq!(roundtrip!(&with_referrer, RewardAccount), with_referrer);

    let without_referrer = RewardAccount {
        pending: 0,
        referrer: None,
        referred_count: 0,
        registered: true,
    };
    assert_eq!(roundtrip!(&without_referrer, RewardAccount), without_referrer);
}

#[test]
fn config_roundtrips_and_validates() {
    let config = EngineConfig::new(key(10), key(11));
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(roundtrip!(&config, EngineConfig), config);
}

#[test]
fn config_rejects_excessive_rates() {
    let mut config = EngineConfig::new(key(10), key(11));
    config.referral_fee_bps = 10_001;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::RateOutOfRange { .. })
    ));
}

#[test]
fn config_rejects_inverted_bet_bounds() {
    let mut config = EngineConfig::new(key(10), key(11));
    config.min_bet = config.max_bet + 1;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::BetBoundsInverted { .. })
    ));
}

#[test]
fn config_rejects_zero_ratio() {
    let mut config = EngineConfig::new(key(10), key(11));
    config.balance_max_profit_ratio = 0;
    assert!(matches!(config.validate(), Err(ConfigError::ZeroField { .. })));
}

#[test]
fn place_bet_instruction_roundtrips_with_optional_referrer() {
    let with = Instruction::PlaceBet {
        amount: 1_000,
        modulo: 2,
        win_selector: 2,
        referrer: Some(key(3)),
    };
    assert_eq!(roundtrip!(&with, Instruction), with);

    let without = Instruction::PlaceBet {
        amount: 1_000,
        modulo: 100,
        win_selector: 55,
        referrer: None,
    };
    assert_eq!(roundtrip!(&without, Instruction), without);
}

#[test]
fn token_instructions_roundtrip() {
    let transfer_from = Instruction::TokenTransferFrom {
        from: key(6),
        to: key(7),
        amount: 1_234,
    };
    assert_eq!(roundtrip!(&transfer_from, Instruction), transfer_from);

    let approve = Instruction::TokenApprove {
        spender: key(8),
        amount: 99,
    };
    assert_eq!(roundtrip!(&approve, Instruction), approve);
}

#[test]
fn fulfill_randomness_instruction_roundtrips() {
    let instruction = Instruction::FulfillRandomness {
        request_id: 9,
        randomness: [0xAB; 32],
    };
    assert_eq!(roundtrip!(&instruction, Instruction), instruction);
}

#[test]
fn wager_error_event_roundtrips_with_optional_bet_id() {
    let with = Event::WagerError {
        participant: key(5),
        bet_id: Some(12),
        error_code: ERROR_BET_ALREADY_SETTLED,
        message: "Bet already settled".to_string(),
    };
    assert_eq!(roundtrip!(&with, Event), with);

    let without = Event::WagerError {
        participant: key(5),
        bet_id: None,
        error_code: ERROR_NOT_INITIALIZED,
        message: "Engine not configured".to_string(),
    };
    assert_eq!(roundtrip!(&without, Event), without);
}

#[test]
fn keys_and_values_roundtrip_across_tags() {
    let keys = vec![
        Key::Account(key(1)),
        Key::Config,
        Key::Pool,
        Key::Bet(7),
        Key::RandomnessRequest(8),
        Key::RewardAccount(key(2)),
        Key::RewardVault,
        Key::TokenAccount(key(3)),
    ];
    for k in keys {
        assert_eq!(roundtrip!(&k, Key), k);
    }

    let values = vec![
        Value::Pool(PoolState {
            balance: 1,
            locked_in_bets: 2,
            net_pnl: -3,
            next_bet_id: 4,
            next_request_id: 5,
            total_issued: 6,
        }),
        Value::RandomnessRequest(42),
        Value::RewardVault(RewardVault {
            balance: 9,
            total_pending: 8,
            last_harvest_view: 7,
        }),
    ];
    for v in values {
        assert_eq!(roundtrip!(&v, Value), v);
    }
}
