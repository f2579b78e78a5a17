use super::super::*;
use super::wager_error_vec;
use fairroll_types::wager::{
    ERROR_BET_OUT_OF_RANGE, ERROR_INSUFFICIENT_ALLOWANCE, ERROR_INSUFFICIENT_FUNDS,
};

impl<'a, S: State> Layer<'a, S> {
    // === Token ledger ===

    pub(in crate::layer) async fn handle_token_transfer(
        &mut self,
        public: &PublicKey,
        to: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<Vec<Event>> {
        let mut from_account = self.get_token_account(public).await?;
        if from_account.balance < amount {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INSUFFICIENT_FUNDS,
                format!(
                    "Insufficient balance: have {}, need {}",
                    from_account.balance, amount
                ),
            ));
        }

        if to == public {
            // Nothing moves, but the transfer is still acknowledged.
            self.insert(
                Key::TokenAccount(public.clone()),
                Value::TokenAccount(from_account),
            );
        } else {
            from_account.balance -= amount;
            self.insert(
                Key::TokenAccount(public.clone()),
                Value::TokenAccount(from_account),
            );
            let mut to_account = self.get_token_account(to).await?;
            to_account.balance = to_account.balance.saturating_add(amount);
            self.insert(Key::TokenAccount(to.clone()), Value::TokenAccount(to_account));
        }

        Ok(vec![Event::Transferred {
            from: public.clone(),
            to: to.clone(),
            amount,
        }])
    }

    pub(in crate::layer) async fn handle_token_approve(
        &mut self,
        public: &PublicKey,
        spender: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<Vec<Event>> {
        let mut account = self.get_token_account(public).await?;
        account.set_allowance(spender.clone(), amount);
        self.insert(
            Key::TokenAccount(public.clone()),
            Value::TokenAccount(account),
        );

        Ok(vec![Event::Approved {
            owner: public.clone(),
            spender: spender.clone(),
            amount,
        }])
    }

    pub(in crate::layer) async fn handle_token_transfer_from(
        &mut self,
        public: &PublicKey,
        from: &PublicKey,
        to: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<Vec<Event>> {
        let mut from_account = self.get_token_account(from).await?;
        let allowance = from_account.allowance(public);
        if allowance < amount {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INSUFFICIENT_ALLOWANCE,
                format!("Allowance {} below requested {}", allowance, amount),
            ));
        }
        if from_account.balance < amount {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INSUFFICIENT_FUNDS,
                format!(
                    "Insufficient balance: have {}, need {}",
                    from_account.balance, amount
                ),
            ));
        }

        from_account.set_allowance(public.clone(), allowance - amount);
        if to == from {
            self.insert(
                Key::TokenAccount(from.clone()),
                Value::TokenAccount(from_account),
            );
        } else {
            from_account.balance -= amount;
            self.insert(
                Key::TokenAccount(from.clone()),
                Value::TokenAccount(from_account),
            );
            let mut to_account = self.get_token_account(to).await?;
            to_account.balance = to_account.balance.saturating_add(amount);
            self.insert(Key::TokenAccount(to.clone()), Value::TokenAccount(to_account));
        }

        Ok(vec![Event::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        }])
    }

    pub(in crate::layer) async fn handle_fund_pool(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<Vec<Event>> {
        if amount == 0 {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_BET_OUT_OF_RANGE,
                "Funding amount must be greater than zero",
            ));
        }
        let mut funder = self.get_token_account(public).await?;
        if funder.balance < amount {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INSUFFICIENT_FUNDS,
                format!(
                    "Insufficient balance: have {}, need {}",
                    funder.balance, amount
                ),
            ));
        }
        funder.balance -= amount;
        let mut pool = self.get_or_init_pool().await?;
        pool.balance = pool.balance.saturating_add(amount);
        let pool_balance = pool.balance;

        self.insert(
            Key::TokenAccount(public.clone()),
            Value::TokenAccount(funder),
        );
        self.insert(Key::Pool, Value::Pool(pool));

        tracing::debug!(funder = ?public, amount, pool_balance, "pool funded");

        Ok(vec![Event::PoolFunded {
            funder: public.clone(),
            amount,
            pool_balance,
        }])
    }
}
