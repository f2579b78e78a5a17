use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

/// House pool accounting. `balance` is the pool's token holding;
/// `locked_in_bets` is the sum of `possible_win_amount` over all
/// currently-open bets and must never exceed `balance`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PoolState {
    pub balance: u64,
    pub locked_in_bets: u64,
    /// Operator running profit: house edge collected minus wins paid.
    pub net_pnl: i128,
    /// Next bet identifier (bets are append-only; index = id).
    pub next_bet_id: u64,
    /// Next randomness request identifier.
    pub next_request_id: u64,
    /// Total token supply ever minted; lets audits check conservation.
    pub total_issued: u64,
}

impl Write for PoolState {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.locked_in_bets.write(writer);
        self.net_pnl.write(writer);
        self.next_bet_id.write(writer);
        self.next_request_id.write(writer);
        self.total_issued.write(writer);
    }
}

impl Read for PoolState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
            locked_in_bets: u64::read(reader)?,
            net_pnl: i128::read(reader)?,
            next_bet_id: u64::read(reader)?,
            next_request_id: u64::read(reader)?,
            total_issued: u64::read(reader)?,
        })
    }
}

impl EncodeSize for PoolState {
    fn encode_size(&self) -> usize {
        self.balance.encode_size()
            + self.locked_in_bets.encode_size()
            + self.net_pnl.encode_size()
            + self.next_bet_id.encode_size()
            + self.next_request_id.encode_size()
            + self.total_issued.encode_size()
    }
}
