use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use fairroll_types::execution::{Event, Instruction, Key, Output, Transaction, Value};
use fairroll_types::token::TokenAccount;
use fairroll_types::wager::{EngineConfig, PoolState, RewardAccount, RewardVault};
use std::collections::BTreeMap;
use tracing::debug;

use crate::guard::CallLock;
use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};

mod handlers;

/// Executes signed transactions against a [`State`] store, staging every
/// write in a pending overlay that commits atomically per batch.
///
/// One `Layer` is created per view; `view` is the only time-like input
/// the settlement logic sees.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,

    view: u64,
    exclusive: CallLock,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, view: u64) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),

            view,
            exclusive: CallLock::new(),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    pub fn view(&self) -> u64 {
        self.view
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(())
    }

    async fn apply(&mut self, transaction: &Transaction) -> Result<Vec<Event>> {
        let instruction = &transaction.instruction;
        let public = &transaction.public;

        match instruction {
            Instruction::PlaceBet {
                amount,
                modulo,
                win_selector,
                referrer,
            } => {
                self.handle_place_bet(public, *amount, *modulo, *win_selector, referrer.clone())
                    .await
            }
            Instruction::FulfillRandomness {
                request_id,
                randomness,
            } => {
                self.handle_fulfill_randomness(public, *request_id, randomness)
                    .await
            }
            Instruction::RefundBet { bet_id } => self.handle_refund_bet(public, *bet_id).await,
            Instruction::WithdrawReward => self.handle_withdraw_reward(public).await,
            Instruction::TokenTransfer { to, amount } => {
                self.handle_token_transfer(public, to, *amount).await
            }
            Instruction::TokenApprove { spender, amount } => {
                self.handle_token_approve(public, spender, *amount).await
            }
            Instruction::TokenTransferFrom { from, to, amount } => {
                self.handle_token_transfer_from(public, from, to, *amount)
                    .await
            }
            Instruction::FundPool { amount } => self.handle_fund_pool(public, *amount).await,
            Instruction::Mint { to, amount } => self.handle_mint(public, to, *amount).await,
            Instruction::SetConfig { config } => self.handle_set_config(public, config).await,
        }
    }

    async fn config(&mut self) -> Result<Option<EngineConfig>> {
        Ok(match self.get(Key::Config).await? {
            Some(Value::Config(config)) => Some(config),
            _ => None,
        })
    }

    async fn get_or_init_pool(&mut self) -> Result<PoolState> {
        Ok(match self.get(Key::Pool).await? {
            Some(Value::Pool(pool)) => pool,
            _ => PoolState::default(),
        })
    }

    async fn get_or_init_reward_vault(&mut self) -> Result<RewardVault> {
        Ok(match self.get(Key::RewardVault).await? {
            Some(Value::RewardVault(vault)) => vault,
            _ => RewardVault {
                last_harvest_view: self.view,
                ..Default::default()
            },
        })
    }

    async fn get_or_init_reward_account(&mut self, public: &PublicKey) -> Result<RewardAccount> {
        Ok(match self.get(Key::RewardAccount(public.clone())).await? {
            Some(Value::RewardAccount(account)) => account,
            _ => RewardAccount::default(),
        })
    }

    async fn get_token_account(&mut self, public: &PublicKey) -> Result<TokenAccount> {
        Ok(match self.get(Key::TokenAccount(public.clone())).await? {
            Some(Value::TokenAccount(account)) => account,
            _ => TokenAccount::default(),
        })
    }

    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));
            outputs.extend(self.apply(&tx).await?.into_iter().map(Output::Event));
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(&key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: Key) -> Result<()> {
        self.pending.insert(key, Status::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use crate::state::Memory;
    use fairroll_types::wager::ERROR_NOT_INITIALIZED;

    #[tokio::test]
    async fn nonce_validation_gates_apply() {
        let state = Memory::default();
        let mut layer = Layer::new(&state, 1);

        let (signer, _) = create_account_keypair(1);

        // Wrong nonce should fail.
        let tx = Transaction::sign(&signer, 1, Instruction::WithdrawReward);
        assert!(layer.prepare(&tx).await.is_err());

        // Correct nonce should succeed.
        let tx = Transaction::sign(&signer, 0, Instruction::WithdrawReward);
        assert!(layer.prepare(&tx).await.is_ok());

        let _ = layer.commit();
    }

    #[tokio::test]
    async fn operations_reject_before_configuration() {
        let state = Memory::default();
        let mut layer = Layer::new(&state, 1);

        let (signer, public) = create_account_keypair(1);
        let tx = Transaction::sign(
            &signer,
            0,
            Instruction::PlaceBet {
                amount: 1_000,
                modulo: 2,
                win_selector: 2,
                referrer: None,
            },
        );
        let (outputs, _) = layer.execute(vec![tx]).await.unwrap();
        assert!(outputs.iter().any(|output| matches!(
            output,
            Output::Event(Event::WagerError {
                participant,
                error_code: ERROR_NOT_INITIALIZED,
                ..
            }) if participant == &public
        )));

        let _ = layer.commit();
    }

    #[tokio::test]
    async fn execute_is_deterministic_for_identical_inputs() {
        let (signer, _) = create_account_keypair(1);
        let (_, spender) = create_account_keypair(2);
        let txs = vec![
            Transaction::sign(
                &signer,
                0,
                Instruction::TokenApprove { spender, amount: 50 },
            ),
            Transaction::sign(&signer, 1, Instruction::WithdrawReward),
        ];

        let state1 = Memory::default();
        let state2 = Memory::default();
        let mut layer1 = Layer::new(&state1, 1);
        let mut layer2 = Layer::new(&state2, 1);

        let (outputs1, nonces1) = layer1.execute(txs.clone()).await.unwrap();
        let (outputs2, nonces2) = layer2.execute(txs).await.unwrap();

        assert_eq!(outputs1, outputs2);
        assert_eq!(nonces1, nonces2);
        assert!(layer1.commit() == layer2.commit());
    }
}
