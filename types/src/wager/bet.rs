use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::MAX_MASK_MODULO;

/// A single wager. Created only by placement, mutated exactly once by
/// settlement or refund, never deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub participant: PublicKey,
    /// Stake, fixed at creation.
    pub amount: u64,
    /// Number of equiprobable outcomes (2..=100).
    pub modulo: u8,
    /// Bitmask over outcomes (modulo <= 40) or "outcome < selector"
    /// threshold (modulo > 40).
    pub win_selector: u64,
    /// View at placement; gates refund eligibility.
    pub placement_view: u64,
    /// Worst-case payout reserved against the pool while the bet is open.
    pub possible_win_amount: u64,
    /// Monotonic false -> true; set by settlement or refund, never reverts.
    pub is_settled: bool,
    /// Resolved outcome, zero until settled.
    pub outcome: u32,
    /// Amount paid to the participant, zero until settled, set once.
    pub win_amount: u64,
}

impl Bet {
    /// Whether the selector is interpreted as a bitmask over outcomes.
    pub fn uses_mask(&self) -> bool {
        self.modulo <= MAX_MASK_MODULO
    }
}

impl Write for Bet {
    fn write(&self, writer: &mut impl BufMut) {
        self.participant.write(writer);
        self.amount.write(writer);
        self.modulo.write(writer);
        self.win_selector.write(writer);
        self.placement_view.write(writer);
        self.possible_win_amount.write(writer);
        self.is_settled.write(writer);
        self.outcome.write(writer);
        self.win_amount.write(writer);
    }
}

impl Read for Bet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            participant: PublicKey::read(reader)?,
            amount: u64::read(reader)?,
            modulo: u8::read(reader)?,
            win_selector: u64::read(reader)?,
            placement_view: u64::read(reader)?,
            possible_win_amount: u64::read(reader)?,
            is_settled: bool::read(reader)?,
            outcome: u32::read(reader)?,
            win_amount: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Bet {
    fn encode_size(&self) -> usize {
        PublicKey::SIZE + u64::SIZE * 5 + u8::SIZE + bool::SIZE + u32::SIZE
    }
}
