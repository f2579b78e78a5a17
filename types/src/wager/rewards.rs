use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

/// Per-participant loyalty-reward and referral state.
///
/// `registered` flips on the participant's first bet and freezes the
/// referral relationship: once set, later referrer hints are no-ops.
/// `referrer` stays `None` for self- or empty hints, so the fee-payment
/// path can distinguish "registered without referrer" from a real one.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RewardAccount {
    /// Pending loyalty reward; increases on losing bets, zeroed on withdrawal.
    pub pending: u64,
    pub referrer: Option<PublicKey>,
    /// Number of participants this account has referred.
    pub referred_count: u32,
    pub registered: bool,
}

impl Write for RewardAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.pending.write(writer);
        match &self.referrer {
            Some(referrer) => {
                true.write(writer);
                referrer.write(writer);
            }
            None => false.write(writer),
        }
        self.referred_count.write(writer);
        self.registered.write(writer);
    }
}

impl Read for RewardAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let pending = u64::read(reader)?;
        let has_referrer = bool::read(reader)?;
        let referrer = if has_referrer {
            Some(PublicKey::read(reader)?)
        } else {
            None
        };
        Ok(Self {
            pending,
            referrer,
            referred_count: u32::read(reader)?,
            registered: bool::read(reader)?,
        })
    }
}

impl EncodeSize for RewardAccount {
    fn encode_size(&self) -> usize {
        u64::SIZE
            + bool::SIZE
            + self.referrer.as_ref().map(|_| PublicKey::SIZE).unwrap_or(0)
            + u32::SIZE
            + bool::SIZE
    }
}

/// Funding vault for loyalty rewards. `total_pending` mirrors the sum of
/// all `RewardAccount::pending` balances; `balance` is topped up by
/// harvesting the external yield facility and only drained by payouts.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RewardVault {
    pub balance: u64,
    pub total_pending: u64,
    /// View of the last harvest; yield accrues linearly since then.
    pub last_harvest_view: u64,
}

impl Write for RewardVault {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.total_pending.write(writer);
        self.last_harvest_view.write(writer);
    }
}

impl Read for RewardVault {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
            total_pending: u64::read(reader)?,
            last_harvest_view: u64::read(reader)?,
        })
    }
}

impl EncodeSize for RewardVault {
    fn encode_size(&self) -> usize {
        self.balance.encode_size()
            + self.total_pending.encode_size()
            + self.last_harvest_view.encode_size()
    }
}
