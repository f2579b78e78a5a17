use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error as ThisError;

use super::{
    BPS_DENOMINATOR, DEFAULT_BALANCE_MAX_PROFIT_RATIO, DEFAULT_HARVEST_SINK_BPS,
    DEFAULT_HOUSE_EDGE_BPS, DEFAULT_MAX_BET, DEFAULT_MAX_REWARD, DEFAULT_MIN_BET,
    DEFAULT_ORACLE_FEE_RESERVE, DEFAULT_REFERRAL_FEE_BPS, DEFAULT_REFUND_DELAY_VIEWS,
    DEFAULT_REWARD_BPS, DEFAULT_WEALTH_TAX_BPS, DEFAULT_WEALTH_TAX_THRESHOLD,
    DEFAULT_YIELD_RATE_PER_VIEW,
};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate out of range: {field} = {got} bps (max {max})")]
    RateOutOfRange {
        field: &'static str,
        got: u16,
        max: u16,
    },
    #[error("bet bounds inverted: min_bet {min} > max_bet {max}")]
    BetBoundsInverted { min: u64, max: u64 },
    #[error("{field} must be non-zero")]
    ZeroField { field: &'static str },
}

/// Engine configuration. All rates carry an explicit basis-point
/// denominator; there is no floating point anywhere in settlement math.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// The only key allowed to deliver randomness callbacks.
    pub oracle: PublicKey,
    /// Companion protocol sink receiving a share of each harvest.
    pub sink: PublicKey,
    pub house_edge_bps: u16,
    pub wealth_tax_bps: u16,
    /// Stake step above which the wealth tax applies, per whole multiple.
    pub wealth_tax_threshold: u64,
    pub min_bet: u64,
    pub max_bet: u64,
    /// Max profit for a single bet is pool_balance / this ratio.
    pub balance_max_profit_ratio: u64,
    /// Share of the collected fee redistributed as loyalty reward.
    pub reward_bps: u16,
    /// Per-bet cap on the loyalty reward.
    pub max_reward: u64,
    /// Share of each paid withdrawal owed to the recorded referrer.
    pub referral_fee_bps: u16,
    /// Pool balance that must stay liquid to fund randomness requests.
    pub oracle_fee_reserve: u64,
    /// Views that must elapse before an unresolved bet is refundable.
    pub refund_delay_views: u64,
    /// Yield accrued by the external facility per elapsed view.
    pub yield_rate_per_view: u64,
    /// Share of each harvest forwarded to the companion sink.
    pub harvest_sink_bps: u16,
}

impl EngineConfig {
    pub fn new(oracle: PublicKey, sink: PublicKey) -> Self {
        Self {
            oracle,
            sink,
            house_edge_bps: DEFAULT_HOUSE_EDGE_BPS,
            wealth_tax_bps: DEFAULT_WEALTH_TAX_BPS,
            wealth_tax_threshold: DEFAULT_WEALTH_TAX_THRESHOLD,
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            balance_max_profit_ratio: DEFAULT_BALANCE_MAX_PROFIT_RATIO,
            reward_bps: DEFAULT_REWARD_BPS,
            max_reward: DEFAULT_MAX_REWARD,
            referral_fee_bps: DEFAULT_REFERRAL_FEE_BPS,
            oracle_fee_reserve: DEFAULT_ORACLE_FEE_RESERVE,
            refund_delay_views: DEFAULT_REFUND_DELAY_VIEWS,
            yield_rate_per_view: DEFAULT_YIELD_RATE_PER_VIEW,
            harvest_sink_bps: DEFAULT_HARVEST_SINK_BPS,
        }
    }

    /// Range checks applied before a configuration is accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = BPS_DENOMINATOR as u16;
        for (field, got) in [
            ("house_edge_bps", self.house_edge_bps),
            ("wealth_tax_bps", self.wealth_tax_bps),
            ("reward_bps", self.reward_bps),
            ("referral_fee_bps", self.referral_fee_bps),
            ("harvest_sink_bps", self.harvest_sink_bps),
        ] {
            if got > max {
                return Err(ConfigError::RateOutOfRange { field, got, max });
            }
        }
        if self.min_bet > self.max_bet {
            return Err(ConfigError::BetBoundsInverted {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        if self.min_bet == 0 {
            return Err(ConfigError::ZeroField { field: "min_bet" });
        }
        if self.balance_max_profit_ratio == 0 {
            return Err(ConfigError::ZeroField {
                field: "balance_max_profit_ratio",
            });
        }
        if self.wealth_tax_threshold == 0 {
            return Err(ConfigError::ZeroField {
                field: "wealth_tax_threshold",
            });
        }
        Ok(())
    }
}

impl Write for EngineConfig {
    fn write(&self, writer: &mut impl BufMut) {
        self.oracle.write(writer);
        self.sink.write(writer);
        self.house_edge_bps.write(writer);
        self.wealth_tax_bps.write(writer);
        self.wealth_tax_threshold.write(writer);
        self.min_bet.write(writer);
        self.max_bet.write(writer);
        self.balance_max_profit_ratio.write(writer);
        self.reward_bps.write(writer);
        self.max_reward.write(writer);
        self.referral_fee_bps.write(writer);
        self.oracle_fee_reserve.write(writer);
        self.refund_delay_views.write(writer);
        self.yield_rate_per_view.write(writer);
        self.harvest_sink_bps.write(writer);
    }
}

impl Read for EngineConfig {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            oracle: PublicKey::read(reader)?,
            sink: PublicKey::read(reader)?,
            house_edge_bps: u16::read(reader)?,
            wealth_tax_bps: u16::read(reader)?,
            wealth_tax_threshold: u64::read(reader)?,
            min_bet: u64::read(reader)?,
            max_bet: u64::read(reader)?,
            balance_max_profit_ratio: u64::read(reader)?,
            reward_bps: u16::read(reader)?,
            max_reward: u64::read(reader)?,
            referral_fee_bps: u16::read(reader)?,
            oracle_fee_reserve: u64::read(reader)?,
            refund_delay_views: u64::read(reader)?,
            yield_rate_per_view: u64::read(reader)?,
            harvest_sink_bps: u16::read(reader)?,
        })
    }
}

impl EncodeSize for EngineConfig {
    fn encode_size(&self) -> usize {
        PublicKey::SIZE * 2 + u16::SIZE * 5 + u64::SIZE * 8
    }
}
