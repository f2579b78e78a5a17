use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;

use crate::token::TokenAccount;
use crate::wager::{
    read_string, string_encode_size, write_string, Bet, EngineConfig, PoolState, RewardAccount,
    RewardVault, MAX_ERROR_MESSAGE_LENGTH,
};

pub const NAMESPACE: &[u8] = b"_FAIRROLL";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";

/// Length of the raw random value delivered by the oracle.
pub const RANDOMNESS_LEN: usize = 32;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // We don't include the signature as part of the digest (any valid
        // signature will be valid for the transaction)
        hasher.finalize()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Stake `amount` on a bet with `modulo` equiprobable outcomes.
    /// Binary: [1] [amount:u64 BE] [modulo:u8] [selector:u64 BE] [hasReferrer:u8] [referrer?]
    PlaceBet {
        amount: u64,
        modulo: u8,
        win_selector: u64,
        referrer: Option<PublicKey>,
    },

    /// Oracle callback delivering the raw random value for a request.
    /// Binary: [2] [requestId:u64 BE] [randomness:32]
    FulfillRandomness {
        request_id: u64,
        randomness: [u8; RANDOMNESS_LEN],
    },

    /// Refund a bet the oracle never resolved (after the timeout window).
    /// Binary: [3] [betId:u64 BE]
    RefundBet { bet_id: u64 },

    /// Withdraw the caller's accumulated loyalty reward.
    /// Binary: [4]
    WithdrawReward,

    /// Transfer tokens from the signer to another account.
    /// Binary: [5] [to:32] [amount:u64 BE]
    TokenTransfer { to: PublicKey, amount: u64 },

    /// Set the signer's allowance for a spender.
    /// Binary: [6] [spender:32] [amount:u64 BE]
    TokenApprove { spender: PublicKey, amount: u64 },

    /// Move tokens out of `from` within the signer's allowance.
    /// Binary: [10] [from:32] [to:32] [amount:u64 BE]
    TokenTransferFrom {
        from: PublicKey,
        to: PublicKey,
        amount: u64,
    },

    /// Move tokens from the signer into the house pool (bankroll seeding).
    /// Binary: [7] [amount:u64 BE]
    FundPool { amount: u64 },

    /// Issue new supply to an account (admin only).
    /// Binary: [8] [to:32] [amount:u64 BE]
    Mint { to: PublicKey, amount: u64 },

    /// Replace the engine configuration (admin only).
    /// Binary: [9] [config]
    SetConfig { config: EngineConfig },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PlaceBet {
                amount,
                modulo,
                win_selector,
                referrer,
            } => {
                1u8.write(writer);
                amount.write(writer);
                modulo.write(writer);
                win_selector.write(writer);
                match referrer {
                    Some(referrer) => {
                        true.write(writer);
                        referrer.write(writer);
                    }
                    None => false.write(writer),
                }
            }
            Self::FulfillRandomness {
                request_id,
                randomness,
            } => {
                2u8.write(writer);
                request_id.write(writer);
                writer.put_slice(randomness);
            }
            Self::RefundBet { bet_id } => {
                3u8.write(writer);
                bet_id.write(writer);
            }
            Self::WithdrawReward => 4u8.write(writer),
            Self::TokenTransfer { to, amount } => {
                5u8.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::TokenApprove { spender, amount } => {
                6u8.write(writer);
                spender.write(writer);
                amount.write(writer);
            }
            Self::TokenTransferFrom { from, to, amount } => {
                10u8.write(writer);
                from.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::FundPool { amount } => {
                7u8.write(writer);
                amount.write(writer);
            }
            Self::Mint { to, amount } => {
                8u8.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::SetConfig { config } => {
                9u8.write(writer);
                config.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match reader.get_u8() {
            1 => {
                let amount = u64::read(reader)?;
                let modulo = u8::read(reader)?;
                let win_selector = u64::read(reader)?;
                let has_referrer = bool::read(reader)?;
                let referrer = if has_referrer {
                    Some(PublicKey::read(reader)?)
                } else {
                    None
                };
                Self::PlaceBet {
                    amount,
                    modulo,
                    win_selector,
                    referrer,
                }
            }
            2 => {
                let request_id = u64::read(reader)?;
                if reader.remaining() < RANDOMNESS_LEN {
                    return Err(Error::EndOfBuffer);
                }
                let mut randomness = [0u8; RANDOMNESS_LEN];
                reader.copy_to_slice(&mut randomness);
                Self::FulfillRandomness {
                    request_id,
                    randomness,
                }
            }
            3 => Self::RefundBet {
                bet_id: u64::read(reader)?,
            },
            4 => Self::WithdrawReward,
            5 => Self::TokenTransfer {
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            6 => Self::TokenApprove {
                spender: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            7 => Self::FundPool {
                amount: u64::read(reader)?,
            },
            8 => Self::Mint {
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            9 => Self::SetConfig {
                config: EngineConfig::read(reader)?,
            },
            10 => Self::TokenTransferFrom {
                from: PublicKey::read(reader)?,
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PlaceBet { referrer, .. } => {
                    u64::SIZE
                        + u8::SIZE
                        + u64::SIZE
                        + bool::SIZE
                        + referrer.as_ref().map(|_| PublicKey::SIZE).unwrap_or(0)
                }
                Self::FulfillRandomness { .. } => u64::SIZE + RANDOMNESS_LEN,
                Self::RefundBet { .. } => u64::SIZE,
                Self::WithdrawReward => 0,
                Self::TokenTransfer { .. } => PublicKey::SIZE + u64::SIZE,
                Self::TokenApprove { .. } => PublicKey::SIZE + u64::SIZE,
                Self::TokenTransferFrom { .. } => PublicKey::SIZE * 2 + u64::SIZE,
                Self::FundPool { .. } => u64::SIZE,
                Self::Mint { .. } => PublicKey::SIZE + u64::SIZE,
                Self::SetConfig { config } => config.encode_size(),
            }
    }
}

/// Minimal account structure for transaction nonce tracking.
/// Used for replay protection across all transaction types.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Account for nonce tracking (tag 0)
    Account(PublicKey),

    // Engine singletons (tags 1-2)
    Config,
    Pool,

    // Bet ledger (tags 3-4)
    Bet(u64),
    RandomnessRequest(u64),

    // Reward & referral ledger (tags 5-6)
    RewardAccount(PublicKey),
    RewardVault,

    // Token ledger (tag 7)
    TokenAccount(PublicKey),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::Config => 1u8.write(writer),
            Self::Pool => 2u8.write(writer),
            Self::Bet(id) => {
                3u8.write(writer);
                id.write(writer);
            }
            Self::RandomnessRequest(id) => {
                4u8.write(writer);
                id.write(writer);
            }
            Self::RewardAccount(pk) => {
                5u8.write(writer);
                pk.write(writer);
            }
            Self::RewardVault => 6u8.write(writer),
            Self::TokenAccount(pk) => {
                7u8.write(writer);
                pk.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match reader.get_u8() {
            0 => Self::Account(PublicKey::read(reader)?),
            1 => Self::Config,
            2 => Self::Pool,
            3 => Self::Bet(u64::read(reader)?),
            4 => Self::RandomnessRequest(u64::read(reader)?),
            5 => Self::RewardAccount(PublicKey::read(reader)?),
            6 => Self::RewardVault,
            7 => Self::TokenAccount(PublicKey::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) => PublicKey::SIZE,
                Self::Config => 0,
                Self::Pool => 0,
                Self::Bet(_) => u64::SIZE,
                Self::RandomnessRequest(_) => u64::SIZE,
                Self::RewardAccount(_) => PublicKey::SIZE,
                Self::RewardVault => 0,
                Self::TokenAccount(_) => PublicKey::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    /// Account for nonce tracking (tag 0)
    Account(Account),

    // Engine singletons (tags 1-2)
    Config(EngineConfig),
    Pool(PoolState),

    // Bet ledger (tags 3-4)
    Bet(Bet),
    /// Bet index a pending randomness request resolves to.
    RandomnessRequest(u64),

    // Reward & referral ledger (tags 5-6)
    RewardAccount(RewardAccount),
    RewardVault(RewardVault),

    // Token ledger (tag 7)
    TokenAccount(TokenAccount),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Config(config) => {
                1u8.write(writer);
                config.write(writer);
            }
            Self::Pool(pool) => {
                2u8.write(writer);
                pool.write(writer);
            }
            Self::Bet(bet) => {
                3u8.write(writer);
                bet.write(writer);
            }
            Self::RandomnessRequest(bet_id) => {
                4u8.write(writer);
                bet_id.write(writer);
            }
            Self::RewardAccount(account) => {
                5u8.write(writer);
                account.write(writer);
            }
            Self::RewardVault(vault) => {
                6u8.write(writer);
                vault.write(writer);
            }
            Self::TokenAccount(account) => {
                7u8.write(writer);
                account.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match reader.get_u8() {
            0 => Self::Account(Account::read(reader)?),
            1 => Self::Config(EngineConfig::read(reader)?),
            2 => Self::Pool(PoolState::read(reader)?),
            3 => Self::Bet(Bet::read(reader)?),
            4 => Self::RandomnessRequest(u64::read(reader)?),
            5 => Self::RewardAccount(RewardAccount::read(reader)?),
            6 => Self::RewardVault(RewardVault::read(reader)?),
            7 => Self::TokenAccount(TokenAccount::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Config(config) => config.encode_size(),
                Self::Pool(pool) => pool.encode_size(),
                Self::Bet(bet) => bet.encode_size(),
                Self::RandomnessRequest(bet_id) => bet_id.encode_size(),
                Self::RewardAccount(account) => account.encode_size(),
                Self::RewardVault(vault) => vault.encode_size(),
                Self::TokenAccount(account) => account.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Bet lifecycle (tags 20-22)
    BetPlaced {
        bet_id: u64,
        request_id: u64,
        participant: PublicKey,
        amount: u64,
        modulo: u8,
        win_selector: u64,
        possible_win_amount: u64,
    },
    BetSettled {
        bet_id: u64,
        participant: PublicKey,
        outcome: u32,
        win_amount: u64,
        reward_amount: u64,
    },
    BetRefunded {
        bet_id: u64,
        participant: PublicKey,
        amount: u64,
    },

    // Reward & referral ledger (tags 23-26)
    RewardWithdrawn {
        participant: PublicKey,
        amount: u64,
    },
    HarvestCollected {
        harvested: u64,
        sink_share: u64,
        vault_balance: u64,
    },
    ReferrerRecorded {
        participant: PublicKey,
        referrer: PublicKey,
    },
    ReferralFeePaid {
        referrer: PublicKey,
        participant: PublicKey,
        amount: u64,
    },

    // Token ledger (tags 27-30)
    PoolFunded {
        funder: PublicKey,
        amount: u64,
        pool_balance: u64,
    },
    Transferred {
        from: PublicKey,
        to: PublicKey,
        amount: u64,
    },
    Approved {
        owner: PublicKey,
        spender: PublicKey,
        amount: u64,
    },
    Minted {
        to: PublicKey,
        amount: u64,
    },

    // Administration (tag 31)
    ConfigUpdated,

    // Error event (tag 32)
    WagerError {
        participant: PublicKey,
        bet_id: Option<u64>,
        error_code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::BetPlaced {
                bet_id,
                request_id,
                participant,
                amount,
                modulo,
                win_selector,
                possible_win_amount,
            } => {
                20u8.write(writer);
                bet_id.write(writer);
                request_id.write(writer);
                participant.write(writer);
                amount.write(writer);
                modulo.write(writer);
                win_selector.write(writer);
                possible_win_amount.write(writer);
            }
            Self::BetSettled {
                bet_id,
                participant,
                outcome,
                win_amount,
                reward_amount,
            } => {
                21u8.write(writer);
                bet_id.write(writer);
                participant.write(writer);
                outcome.write(writer);
                win_amount.write(writer);
                reward_amount.write(writer);
            }
            Self::BetRefunded {
                bet_id,
                participant,
                amount,
            } => {
                22u8.write(writer);
                bet_id.write(writer);
                participant.write(writer);
                amount.write(writer);
            }
            Self::RewardWithdrawn {
                participant,
                amount,
            } => {
                23u8.write(writer);
                participant.write(writer);
                amount.write(writer);
            }
            Self::HarvestCollected {
                harvested,
                sink_share,
                vault_balance,
            } => {
                24u8.write(writer);
                harvested.write(writer);
                sink_share.write(writer);
                vault_balance.write(writer);
            }
            Self::ReferrerRecorded {
                participant,
                referrer,
            } => {
                25u8.write(writer);
                participant.write(writer);
                referrer.write(writer);
            }
            Self::ReferralFeePaid {
                referrer,
                participant,
                amount,
            } => {
                26u8.write(writer);
                referrer.write(writer);
                participant.write(writer);
                amount.write(writer);
            }
            Self::PoolFunded {
                funder,
                amount,
                pool_balance,
            } => {
                27u8.write(writer);
                funder.write(writer);
                amount.write(writer);
                pool_balance.write(writer);
            }
            Self::Transferred { from, to, amount } => {
                28u8.write(writer);
                from.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::Approved {
                owner,
                spender,
                amount,
            } => {
                29u8.write(writer);
                owner.write(writer);
                spender.write(writer);
                amount.write(writer);
            }
            Self::Minted { to, amount } => {
                30u8.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::ConfigUpdated => 31u8.write(writer),
            Self::WagerError {
                participant,
                bet_id,
                error_code,
                message,
            } => {
                32u8.write(writer);
                participant.write(writer);
                match bet_id {
                    Some(id) => {
                        true.write(writer);
                        id.write(writer);
                    }
                    None => false.write(writer),
                }
                error_code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match reader.get_u8() {
            20 => Self::BetPlaced {
                bet_id: u64::read(reader)?,
                request_id: u64::read(reader)?,
                participant: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                modulo: u8::read(reader)?,
                win_selector: u64::read(reader)?,
                possible_win_amount: u64::read(reader)?,
            },
            21 => Self::BetSettled {
                bet_id: u64::read(reader)?,
                participant: PublicKey::read(reader)?,
                outcome: u32::read(reader)?,
                win_amount: u64::read(reader)?,
                reward_amount: u64::read(reader)?,
            },
            22 => Self::BetRefunded {
                bet_id: u64::read(reader)?,
                participant: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            23 => Self::RewardWithdrawn {
                participant: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            24 => Self::HarvestCollected {
                harvested: u64::read(reader)?,
                sink_share: u64::read(reader)?,
                vault_balance: u64::read(reader)?,
            },
            25 => Self::ReferrerRecorded {
                participant: PublicKey::read(reader)?,
                referrer: PublicKey::read(reader)?,
            },
            26 => Self::ReferralFeePaid {
                referrer: PublicKey::read(reader)?,
                participant: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            27 => Self::PoolFunded {
                funder: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                pool_balance: u64::read(reader)?,
            },
            28 => Self::Transferred {
                from: PublicKey::read(reader)?,
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            29 => Self::Approved {
                owner: PublicKey::read(reader)?,
                spender: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            30 => Self::Minted {
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            31 => Self::ConfigUpdated,
            32 => {
                let participant = PublicKey::read(reader)?;
                let has_bet_id = bool::read(reader)?;
                let bet_id = if has_bet_id {
                    Some(u64::read(reader)?)
                } else {
                    None
                };
                Self::WagerError {
                    participant,
                    bet_id,
                    error_code: u8::read(reader)?,
                    message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
                }
            }
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::BetPlaced { .. } => u64::SIZE * 5 + PublicKey::SIZE + u8::SIZE,
                Self::BetSettled { .. } => u64::SIZE * 3 + PublicKey::SIZE + u32::SIZE,
                Self::BetRefunded { .. } => u64::SIZE * 2 + PublicKey::SIZE,
                Self::RewardWithdrawn { .. } => PublicKey::SIZE + u64::SIZE,
                Self::HarvestCollected { .. } => u64::SIZE * 3,
                Self::ReferrerRecorded { .. } => PublicKey::SIZE * 2,
                Self::ReferralFeePaid { .. } => PublicKey::SIZE * 2 + u64::SIZE,
                Self::PoolFunded { .. } => PublicKey::SIZE + u64::SIZE * 2,
                Self::Transferred { .. } => PublicKey::SIZE * 2 + u64::SIZE,
                Self::Approved { .. } => PublicKey::SIZE * 2 + u64::SIZE,
                Self::Minted { .. } => PublicKey::SIZE + u64::SIZE,
                Self::ConfigUpdated => 0,
                Self::WagerError {
                    bet_id, message, ..
                } => {
                    PublicKey::SIZE
                        + bool::SIZE
                        + bet_id.as_ref().map(|_| u64::SIZE).unwrap_or(0)
                        + u8::SIZE
                        + string_encode_size(message)
                }
            }
    }
}

/// A single entry in the execution journal: either a domain event or the
/// transaction that produced the entries preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let output = match reader.get_u8() {
            0 => Self::Event(Event::read(reader)?),
            1 => Self::Transaction(Transaction::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(output)
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Event(event) => event.encode_size(),
                Self::Transaction(transaction) => transaction.encode_size(),
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use commonware_codec::DecodeExt as _;
    use commonware_cryptography::{ed25519::PrivateKey, Signer as _};

    #[test]
    fn signed_transactions_verify_and_roundtrip() {
        let private = PrivateKey::from_seed(42);
        let tx = Transaction::sign(
            &private,
            3,
            Instruction::PlaceBet {
                amount: 500,
                modulo: 6,
                win_selector: 0b000111,
                referrer: None,
            },
        );
        assert!(tx.verify());

        let mut buf = BytesMut::new();
        tx.write(&mut buf);
        assert_eq!(buf.len(), tx.encode_size());
        let decoded = Transaction::decode(buf.as_ref()).expect("decode Transaction");
        assert_eq!(decoded, tx);
        assert!(decoded.verify());
    }

    #[test]
    fn tampered_transactions_fail_verification() {
        let private = PrivateKey::from_seed(43);
        let tx = Transaction::sign(&private, 0, Instruction::WithdrawReward);
        let tampered = Transaction {
            nonce: tx.nonce + 1,
            ..tx
        };
        assert!(!tampered.verify());
    }
}
