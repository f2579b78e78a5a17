use super::super::*;
use super::wager_error_vec;
use fairroll_types::wager::{
    BPS_DENOMINATOR, ERROR_NOTHING_TO_WITHDRAW, ERROR_NOT_INITIALIZED, ERROR_REWARD_POOL_DRY,
    REWARD_CREDIT_CEILING,
};

impl<'a, S: State> Layer<'a, S> {
    // === Reward & referral ledger ===

    /// Record a participant's first bet and, at most once ever, their
    /// referrer. Self-referral is silently ignored; an absent hint still
    /// freezes the relationship so later hints are no-ops.
    pub(in crate::layer) async fn note_first_bet(
        &mut self,
        participant: &PublicKey,
        hint: Option<PublicKey>,
    ) -> anyhow::Result<Option<Event>> {
        let mut account = self.get_or_init_reward_account(participant).await?;
        if account.registered {
            return Ok(None);
        }
        account.registered = true;

        let mut event = None;
        if let Some(referrer) = hint {
            if referrer != *participant {
                account.referrer = Some(referrer.clone());
                let mut referrer_account = self.get_or_init_reward_account(&referrer).await?;
                referrer_account.referred_count = referrer_account.referred_count.saturating_add(1);
                self.insert(
                    Key::RewardAccount(referrer.clone()),
                    Value::RewardAccount(referrer_account),
                );
                event = Some(Event::ReferrerRecorded {
                    participant: participant.clone(),
                    referrer,
                });
            }
        }

        self.insert(
            Key::RewardAccount(participant.clone()),
            Value::RewardAccount(account),
        );
        Ok(event)
    }

    /// Queue a loyalty reward, clamped so one pathological bet can never
    /// inflate the pending liability unboundedly. Returns the credited
    /// amount.
    pub(in crate::layer) async fn add_reward(
        &mut self,
        participant: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<u64> {
        let credited = amount.min(REWARD_CREDIT_CEILING);
        if credited == 0 {
            return Ok(0);
        }
        let mut account = self.get_or_init_reward_account(participant).await?;
        account.pending = account.pending.saturating_add(credited);
        let mut vault = self.get_or_init_reward_vault().await?;
        vault.total_pending = vault.total_pending.saturating_add(credited);
        self.insert(
            Key::RewardAccount(participant.clone()),
            Value::RewardAccount(account),
        );
        self.insert(Key::RewardVault, Value::RewardVault(vault));
        Ok(credited)
    }

    pub(in crate::layer) async fn handle_withdraw_reward(
        &mut self,
        public: &PublicKey,
    ) -> anyhow::Result<Vec<Event>> {
        let guard = self.exclusive.clone();
        let _guard = guard
            .acquire()
            .map_err(|err| anyhow::anyhow!("withdrawal re-entered: {err}"))?;

        let config = match self.config().await? {
            Some(config) => config,
            None => {
                return Ok(wager_error_vec(
                    public,
                    None,
                    ERROR_NOT_INITIALIZED,
                    "Engine not configured",
                ))
            }
        };
        let mut account = self.get_or_init_reward_account(public).await?;
        if account.pending == 0 {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_NOTHING_TO_WITHDRAW,
                "No pending reward",
            ));
        }

        // Harvest the yield facility first, measuring the vault balance
        // around the accrual so the harvest amount is exact. A share of
        // every harvest goes to the companion sink.
        let mut vault = self.get_or_init_reward_vault().await?;
        let balance_before = vault.balance;
        let elapsed = self.view.saturating_sub(vault.last_harvest_view);
        let accrued = config.yield_rate_per_view.saturating_mul(elapsed);
        let sink_share =
            (accrued as u128 * config.harvest_sink_bps as u128 / BPS_DENOMINATOR as u128) as u64;
        vault.balance = vault.balance.saturating_add(accrued - sink_share);
        vault.last_harvest_view = self.view;
        let harvested = (vault.balance - balance_before).saturating_add(sink_share);
        let vault_balance_after_harvest = vault.balance;

        // The vault pays only what it holds. An underfunded vault is not an
        // error state: the caller retries after more yield accrues.
        if vault.balance < account.pending {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_REWARD_POOL_DRY,
                format!(
                    "Vault holds {}, pending {}; retry after more yield accrues",
                    vault.balance, account.pending
                ),
            ));
        }

        let pending = account.pending;
        let paid = pending.min(vault.balance);
        account.pending = 0;
        vault.total_pending = vault.total_pending.saturating_sub(pending);
        vault.balance -= paid;

        // Referral fee comes out of the vault as a share of the paid
        // amount. No referrer on file means the fee step is skipped but
        // the rest of the bookkeeping is identical.
        let mut fee_paid = 0;
        let referrer = account.referrer.clone();
        if referrer.is_some() {
            let fee =
                (paid as u128 * config.referral_fee_bps as u128 / BPS_DENOMINATOR as u128) as u64;
            let fee = fee.min(vault.balance);
            if fee > 0 {
                vault.balance -= fee;
                fee_paid = fee;
            }
        }

        // Harvest mints new reward liquidity; track it for supply audits.
        let mut pool = self.get_or_init_pool().await?;
        pool.total_issued = pool.total_issued.saturating_add(harvested);

        self.insert(
            Key::RewardAccount(public.clone()),
            Value::RewardAccount(account),
        );
        self.insert(Key::RewardVault, Value::RewardVault(vault));
        self.insert(Key::Pool, Value::Pool(pool));

        if sink_share > 0 {
            let mut sink_account = self.get_token_account(&config.sink).await?;
            sink_account.balance = sink_account.balance.saturating_add(sink_share);
            self.insert(
                Key::TokenAccount(config.sink.clone()),
                Value::TokenAccount(sink_account),
            );
        }
        let mut participant_account = self.get_token_account(public).await?;
        participant_account.balance = participant_account.balance.saturating_add(paid);
        self.insert(
            Key::TokenAccount(public.clone()),
            Value::TokenAccount(participant_account),
        );
        if fee_paid > 0 {
            if let Some(ref referrer_key) = referrer {
                let mut referrer_account = self.get_token_account(referrer_key).await?;
                referrer_account.balance = referrer_account.balance.saturating_add(fee_paid);
                self.insert(
                    Key::TokenAccount(referrer_key.clone()),
                    Value::TokenAccount(referrer_account),
                );
            }
        }

        tracing::info!(
            participant = ?public,
            paid,
            harvested,
            sink_share,
            fee_paid,
            "reward withdrawn"
        );

        let mut events = vec![
            Event::HarvestCollected {
                harvested,
                sink_share,
                vault_balance: vault_balance_after_harvest,
            },
            Event::RewardWithdrawn {
                participant: public.clone(),
                amount: paid,
            },
        ];
        if fee_paid > 0 {
            if let Some(referrer_key) = referrer {
                events.push(Event::ReferralFeePaid {
                    referrer: referrer_key,
                    participant: public.clone(),
                    amount: fee_paid,
                });
            }
        }
        Ok(events)
    }
}
