//! Fungible-token ledger types.
//!
//! Every monetary movement in the engine flows through [`TokenAccount`]
//! balances: stakes pulled at placement, payouts at settlement, reward
//! withdrawals, and referral fees.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::{from_hex, hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn hex_encode(bytes: &[u8]) -> String {
    hex(bytes)
}

fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    from_hex(s).ok_or_else(|| "invalid hex string".to_string())
}

mod serde_allowances {
    use super::{hex_decode, hex_encode};
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PublicKey;
    use serde::{Deserialize, Deserializer, Serialize as _, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(
        allowances: &BTreeMap<PublicKey, u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let allowances_serializable: Vec<(String, u64)> = allowances
            .iter()
            .map(|(pk, amt)| (hex_encode(pk.as_ref()), *amt))
            .collect();
        allowances_serializable.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<PublicKey, u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let allowances_raw = Vec::<(String, u64)>::deserialize(deserializer)?;
        let mut allowances = BTreeMap::new();
        for (s, amt) in allowances_raw {
            let bytes = hex_decode(&s).map_err(serde::de::Error::custom)?;
            let mut reader = bytes.as_slice();
            let pk = PublicKey::read(&mut reader)
                .map_err(|_| serde::de::Error::custom("invalid public key"))?;
            allowances.insert(pk, amt);
        }
        Ok(allowances)
    }
}

/// A participant's token balance and spender allowances.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenAccount {
    pub balance: u64,
    // simplistic allowance map: spender -> amount
    #[serde(with = "serde_allowances")]
    pub allowances: BTreeMap<PublicKey, u64>,
}

impl TokenAccount {
    pub fn allowance(&self, spender: &PublicKey) -> u64 {
        self.allowances.get(spender).copied().unwrap_or(0)
    }

    pub fn set_allowance(&mut self, spender: PublicKey, amount: u64) {
        if amount == 0 {
            self.allowances.remove(&spender);
        } else {
            self.allowances.insert(spender, amount);
        }
    }
}

impl Write for TokenAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        (self.allowances.len() as u32).write(writer);
        for (spender, amount) in &self.allowances {
            spender.write(writer);
            amount.write(writer);
        }
    }
}

impl Read for TokenAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, commonware_codec::Error> {
        let balance = u64::read(reader)?;
        let allowance_count = u32::read(reader)?;
        let mut allowances = BTreeMap::new();
        for _ in 0..allowance_count {
            let spender = PublicKey::read(reader)?;
            let amount = u64::read(reader)?;
            allowances.insert(spender, amount);
        }
        Ok(Self {
            balance,
            allowances,
        })
    }
}

impl EncodeSize for TokenAccount {
    fn encode_size(&self) -> usize {
        u64::SIZE + u32::SIZE + self.allowances.len() * (PublicKey::SIZE + u64::SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use commonware_codec::DecodeExt as _;
    use commonware_cryptography::{ed25519::PrivateKey, Signer as _};

    #[test]
    fn binary_encoding_is_canonical_over_allowance_order() {
        let pk1 = PrivateKey::from_seed(1).public_key();
        let pk2 = PrivateKey::from_seed(2).public_key();

        let mut a = TokenAccount {
            balance: 7,
            ..Default::default()
        };
        a.set_allowance(pk2.clone(), 2);
        a.set_allowance(pk1.clone(), 1);

        let mut b = TokenAccount {
            balance: 7,
            ..Default::default()
        };
        b.set_allowance(pk1.clone(), 1);
        b.set_allowance(pk2.clone(), 2);

        let mut buf_a = BytesMut::new();
        a.write(&mut buf_a);
        let mut buf_b = BytesMut::new();
        b.write(&mut buf_b);
        assert_eq!(buf_a.as_ref(), buf_b.as_ref());

        let decoded = TokenAccount::decode(buf_a.as_ref()).expect("decode TokenAccount");
        assert_eq!(decoded.allowance(&pk1), 1);
        assert_eq!(decoded.allowance(&pk2), 2);
    }

    #[test]
    fn zero_allowance_clears_the_entry() {
        let spender = PrivateKey::from_seed(3).public_key();
        let mut account = TokenAccount::default();
        account.set_allowance(spender.clone(), 10);
        assert_eq!(account.allowance(&spender), 10);
        account.set_allowance(spender.clone(), 0);
        assert_eq!(account.allowance(&spender), 0);
        assert!(account.allowances.is_empty());
    }

    #[test]
    fn json_roundtrip_preserves_semantics() {
        let spender = PrivateKey::from_seed(4).public_key();
        let mut account = TokenAccount {
            balance: 42,
            ..Default::default()
        };
        account.set_allowance(spender.clone(), 5);

        let json = serde_json::to_string(&account).expect("serialize TokenAccount");
        let decoded: TokenAccount = serde_json::from_str(&json).expect("deserialize TokenAccount");
        assert_eq!(decoded, account);
        assert_eq!(decoded.allowance(&spender), 5);
    }
}
