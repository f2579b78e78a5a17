/// Maximum number of equiprobable outcomes for a single bet.
pub const MAX_MODULO: u8 = 100;

/// Largest modulo for which the win selector is a bitmask over outcomes.
/// Above this the selector is a "roll under" threshold instead.
pub const MAX_MASK_MODULO: u8 = 40;

/// Exclusive upper bound on bitmask selectors (one bit per outcome).
pub const MAX_BET_MASK: u64 = 1 << MAX_MASK_MODULO;

/// Denominator for all rates expressed in basis points.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Hard ceiling on a single loyalty-reward credit. A pathological bet
/// must never inflate the pending-reward liability past this in one step.
pub const REWARD_CREDIT_CEILING: u64 = 100_000_000;

/// Maximum message length carried by a `WagerError` event.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 128;

/// Default configuration values (basis points unless noted).
pub const DEFAULT_HOUSE_EDGE_BPS: u16 = 100;
pub const DEFAULT_WEALTH_TAX_BPS: u16 = 50;
pub const DEFAULT_WEALTH_TAX_THRESHOLD: u64 = 1_000_000;
pub const DEFAULT_MIN_BET: u64 = 100;
pub const DEFAULT_MAX_BET: u64 = 1_000_000_000;
/// Max profit for a single bet is pool_balance / this ratio.
pub const DEFAULT_BALANCE_MAX_PROFIT_RATIO: u64 = 100;
pub const DEFAULT_REWARD_BPS: u16 = 1_000;
pub const DEFAULT_MAX_REWARD: u64 = 10_000_000;
pub const DEFAULT_REFERRAL_FEE_BPS: u16 = 200;
pub const DEFAULT_ORACLE_FEE_RESERVE: u64 = 10_000;
/// Views that must elapse before an unresolved bet becomes refundable.
pub const DEFAULT_REFUND_DELAY_VIEWS: u64 = 250;
pub const DEFAULT_YIELD_RATE_PER_VIEW: u64 = 1_000;
pub const DEFAULT_HARVEST_SINK_BPS: u16 = 1_000;

/// Error codes for `WagerError` events.
pub const ERROR_NOT_INITIALIZED: u8 = 1;
pub const ERROR_UNAUTHORIZED: u8 = 2;
/// Pool balance no longer covers the randomness-fee reserve.
pub const ERROR_ORACLE_RESERVE: u8 = 3;
pub const ERROR_MODULO_OUT_OF_RANGE: u8 = 4;
pub const ERROR_BET_OUT_OF_RANGE: u8 = 5;
pub const ERROR_SELECTOR_OUT_OF_RANGE: u8 = 6;
/// The derived win chance is zero or certain (roll_under == modulo).
pub const ERROR_WIN_CHANCE_OUT_OF_RANGE: u8 = 7;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 8;
/// Potential payout exceeds the dynamic max-profit limit.
pub const ERROR_RISK_LIMIT: u8 = 9;
/// Locked exposure would exceed the pool's token balance.
pub const ERROR_POOL_INSUFFICIENT: u8 = 10;
pub const ERROR_BET_NOT_FOUND: u8 = 11;
pub const ERROR_BET_ALREADY_SETTLED: u8 = 12;
pub const ERROR_REFUND_TOO_EARLY: u8 = 13;
pub const ERROR_NOTHING_TO_WITHDRAW: u8 = 14;
/// The reward vault cannot cover the pending amount yet; retry later.
pub const ERROR_REWARD_POOL_DRY: u8 = 15;
pub const ERROR_INVALID_CONFIG: u8 = 16;
pub const ERROR_AMOUNT_OVERFLOW: u8 = 17;
pub const ERROR_INSUFFICIENT_ALLOWANCE: u8 = 18;
