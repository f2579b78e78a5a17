use super::super::*;
use super::wager_error_vec;
use crate::risk;
use commonware_utils::modulo;
use fairroll_types::execution::RANDOMNESS_LEN;
use fairroll_types::wager::{
    Bet, ERROR_AMOUNT_OVERFLOW, ERROR_BET_ALREADY_SETTLED, ERROR_BET_NOT_FOUND,
    ERROR_BET_OUT_OF_RANGE, ERROR_INSUFFICIENT_FUNDS, ERROR_MODULO_OUT_OF_RANGE,
    ERROR_NOT_INITIALIZED, ERROR_ORACLE_RESERVE, ERROR_POOL_INSUFFICIENT, ERROR_REFUND_TOO_EARLY,
    ERROR_RISK_LIMIT, ERROR_SELECTOR_OUT_OF_RANGE, ERROR_UNAUTHORIZED,
    ERROR_WIN_CHANCE_OUT_OF_RANGE, MAX_MODULO,
};

impl<'a, S: State> Layer<'a, S> {
    // === Bet lifecycle ===

    pub(in crate::layer) async fn handle_place_bet(
        &mut self,
        public: &PublicKey,
        amount: u64,
        bet_modulo: u8,
        win_selector: u64,
        referrer: Option<PublicKey>,
    ) -> anyhow::Result<Vec<Event>> {
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
        let mut pool = self.get_or_init_pool().await?;

        // Every precondition carries its own rejection reason, and no state
        // is staged until all of them have passed.
        if pool.balance < config.oracle_fee_reserve {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_ORACLE_RESERVE,
                "Pool cannot cover the randomness fee reserve",
            ));
        }
        if bet_modulo < 2 || bet_modulo > MAX_MODULO {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_MODULO_OUT_OF_RANGE,
                format!("Modulo {} outside 2..={}", bet_modulo, MAX_MODULO),
            ));
        }
        if amount < config.min_bet || amount > config.max_bet {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_BET_OUT_OF_RANGE,
                format!(
                    "Amount {} outside {}..={}",
                    amount, config.min_bet, config.max_bet
                ),
            ));
        }
        let roll_under = match risk::roll_under(bet_modulo, win_selector) {
            Ok(roll_under) => roll_under,
            Err(risk::RiskError::WinChanceOutOfRange { .. }) => {
                return Ok(wager_error_vec(
                    public,
                    None,
                    ERROR_WIN_CHANCE_OUT_OF_RANGE,
                    "Selector leaves no way to win or no way to lose",
                ))
            }
            Err(_) => {
                return Ok(wager_error_vec(
                    public,
                    None,
                    ERROR_SELECTOR_OUT_OF_RANGE,
                    "Win selector out of range for this modulo",
                ))
            }
        };
        let possible_win_amount =
            match risk::win_amount(amount, bet_modulo, roll_under, &config) {
                Ok(win) => win,
                Err(err) => {
                    return Ok(wager_error_vec(
                        public,
                        None,
                        ERROR_AMOUNT_OVERFLOW,
                        format!("Payout not computable: {err}"),
                    ))
                }
            };

        let mut participant_account = self.get_token_account(public).await?;
        if participant_account.balance < amount {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INSUFFICIENT_FUNDS,
                format!(
                    "Insufficient balance: have {}, need {}",
                    participant_account.balance, amount
                ),
            ));
        }

        let max_profit = risk::max_profit(pool.balance, &config);
        if possible_win_amount > amount.saturating_add(max_profit) {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_RISK_LIMIT,
                format!(
                    "Potential payout {} exceeds stake + max profit {}",
                    possible_win_amount,
                    amount.saturating_add(max_profit)
                ),
            ));
        }
        // The stake lands in the pool in this same call, so the exposure
        // check runs against the post-transfer balance.
        let locked_after = match pool.locked_in_bets.checked_add(possible_win_amount) {
            Some(locked) => locked,
            None => {
                return Ok(wager_error_vec(
                    public,
                    None,
                    ERROR_AMOUNT_OVERFLOW,
                    "Locked exposure overflow",
                ))
            }
        };
        if locked_after > pool.balance.saturating_add(amount) {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_POOL_INSUFFICIENT,
                "Pool cannot cover the potential payout",
            ));
        }

        // All preconditions passed; stage the effects.
        let mut events = Vec::new();
        if let Some(event) = self.note_first_bet(public, referrer).await? {
            events.push(event);
        }

        participant_account.balance -= amount;
        pool.balance += amount;
        pool.locked_in_bets = locked_after;
        let bet_id = pool.next_bet_id;
        pool.next_bet_id += 1;
        let request_id = pool.next_request_id;
        pool.next_request_id += 1;

        let bet = Bet {
            participant: public.clone(),
            amount,
            modulo: bet_modulo,
            win_selector,
            placement_view: self.view,
            possible_win_amount,
            is_settled: false,
            outcome: 0,
            win_amount: 0,
        };

        self.insert(
            Key::TokenAccount(public.clone()),
            Value::TokenAccount(participant_account),
        );
        self.insert(Key::Pool, Value::Pool(pool));
        self.insert(
            Key::RandomnessRequest(request_id),
            Value::RandomnessRequest(bet_id),
        );
        self.insert(Key::Bet(bet_id), Value::Bet(bet));

        tracing::debug!(
            participant = ?public,
            bet_id,
            request_id,
            amount,
            modulo = bet_modulo,
            possible_win_amount,
            "bet placed"
        );

        events.push(Event::BetPlaced {
            bet_id,
            request_id,
            participant: public.clone(),
            amount,
            modulo: bet_modulo,
            win_selector,
            possible_win_amount,
        });
        Ok(events)
    }

    pub(in crate::layer) async fn handle_fulfill_randomness(
        &mut self,
        public: &PublicKey,
        request_id: u64,
        randomness: &[u8; RANDOMNESS_LEN],
    ) -> anyhow::Result<Vec<Event>> {
        let guard = self.exclusive.clone();
        let _guard = guard
            .acquire()
            .map_err(|err| anyhow::anyhow!("settlement re-entered: {err}"))?;

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
        if public != &config.oracle {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_UNAUTHORIZED,
                "Only the randomness oracle may settle bets",
            ));
        }

        let bet_id = match self.get(Key::RandomnessRequest(request_id)).await? {
            Some(Value::RandomnessRequest(bet_id)) => bet_id,
            _ => {
                return Ok(wager_error_vec(
                    public,
                    None,
                    ERROR_BET_NOT_FOUND,
                    format!("No bet for request {}", request_id),
                ))
            }
        };
        let mut bet = match self.get(Key::Bet(bet_id)).await? {
            Some(Value::Bet(bet)) if bet.amount > 0 => bet,
            _ => {
                return Ok(wager_error_vec(
                    public,
                    Some(bet_id),
                    ERROR_BET_NOT_FOUND,
                    "Bet does not exist",
                ))
            }
        };
        if bet.is_settled {
            return Ok(wager_error_vec(
                public,
                Some(bet_id),
                ERROR_BET_ALREADY_SETTLED,
                "Bet already settled",
            ));
        }

        // Win odds are recomputed from the stored bet; the callback payload
        // contributes the random value and nothing else.
        let roll_under = risk::roll_under(bet.modulo, bet.win_selector)
            .map_err(|err| anyhow::anyhow!("stored bet {bet_id} fails validation: {err}"))?;
        let outcome = modulo(randomness, bet.modulo as u64) as u32;
        let won = if bet.uses_mask() {
            (bet.win_selector >> outcome) & 1 == 1
        } else {
            (outcome as u64) < bet.win_selector
        };

        let mut pool = self.get_or_init_pool().await?;
        // The exposure was reserved for the worst case; release it whatever
        // the outcome.
        pool.locked_in_bets = pool.locked_in_bets.saturating_sub(bet.possible_win_amount);

        bet.is_settled = true;
        bet.outcome = outcome;

        let mut reward_credited = 0;
        if won {
            bet.win_amount = bet.possible_win_amount;
            pool.balance = pool
                .balance
                .checked_sub(bet.win_amount)
                .ok_or_else(|| anyhow::anyhow!("pool cannot cover locked payout"))?;
            pool.net_pnl -= bet.win_amount as i128 - bet.amount as i128;
        } else {
            bet.win_amount = 0;
            pool.net_pnl += bet.amount as i128;
            let reward = risk::reward_amount(bet.amount, bet.modulo, roll_under, &config)
                .map_err(|err| anyhow::anyhow!("reward for bet {bet_id}: {err}"))?;
            reward_credited = self.add_reward(&bet.participant, reward).await?;
        }

        let participant = bet.participant.clone();
        let win_amount = bet.win_amount;

        // Terminal state first, transfers after: the bet is marked settled
        // and the request consumed before any payout is staged.
        self.insert(Key::Bet(bet_id), Value::Bet(bet));
        self.remove(Key::RandomnessRequest(request_id));
        self.insert(Key::Pool, Value::Pool(pool));
        if win_amount > 0 {
            let mut winner = self.get_token_account(&participant).await?;
            winner.balance = winner.balance.saturating_add(win_amount);
            self.insert(
                Key::TokenAccount(participant.clone()),
                Value::TokenAccount(winner),
            );
        }

        tracing::info!(
            bet_id,
            request_id,
            outcome,
            won,
            win_amount,
            reward_credited,
            "bet settled"
        );

        Ok(vec![Event::BetSettled {
            bet_id,
            participant,
            outcome,
            win_amount,
            reward_amount: reward_credited,
        }])
    }

    pub(in crate::layer) async fn handle_refund_bet(
        &mut self,
        public: &PublicKey,
        bet_id: u64,
    ) -> anyhow::Result<Vec<Event>> {
        let guard = self.exclusive.clone();
        let _guard = guard
            .acquire()
            .map_err(|err| anyhow::anyhow!("refund re-entered: {err}"))?;

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
        let mut bet = match self.get(Key::Bet(bet_id)).await? {
            Some(Value::Bet(bet)) if bet.amount > 0 => bet,
            _ => {
                return Ok(wager_error_vec(
                    public,
                    Some(bet_id),
                    ERROR_BET_NOT_FOUND,
                    "Bet does not exist",
                ))
            }
        };
        if bet.is_settled {
            return Ok(wager_error_vec(
                public,
                Some(bet_id),
                ERROR_BET_ALREADY_SETTLED,
                "Bet already settled",
            ));
        }
        let refundable_at = bet.placement_view.saturating_add(config.refund_delay_views);
        if self.view < refundable_at {
            return Ok(wager_error_vec(
                public,
                Some(bet_id),
                ERROR_REFUND_TOO_EARLY,
                format!("Refundable at view {}, current {}", refundable_at, self.view),
            ));
        }

        let mut pool = self.get_or_init_pool().await?;
        // Exposure only reserves the worst-case payout, which can sit below
        // the stake for fee-heavy bets; a drained pool defers the refund.
        if pool.balance < bet.amount {
            return Ok(wager_error_vec(
                public,
                Some(bet_id),
                ERROR_POOL_INSUFFICIENT,
                "Pool cannot cover the refund; retry later",
            ));
        }
        pool.locked_in_bets = pool.locked_in_bets.saturating_sub(bet.possible_win_amount);
        pool.balance -= bet.amount;

        // A refund is a cancellation: the stake comes back in full, no
        // reward or referral side effects.
        bet.is_settled = true;
        bet.win_amount = bet.amount;

        let participant = bet.participant.clone();
        let amount = bet.amount;

        self.insert(Key::Bet(bet_id), Value::Bet(bet));
        self.insert(Key::Pool, Value::Pool(pool));
        let mut account = self.get_token_account(&participant).await?;
        account.balance = account.balance.saturating_add(amount);
        self.insert(
            Key::TokenAccount(participant.clone()),
            Value::TokenAccount(account),
        );

        tracing::info!(bet_id, ?participant, amount, "bet refunded");

        Ok(vec![Event::BetRefunded {
            bet_id,
            participant,
            amount,
        }])
    }
}
