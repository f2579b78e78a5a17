use super::super::*;
use super::{is_admin_public_key, wager_error_vec};
use fairroll_types::wager::{ERROR_INVALID_CONFIG, ERROR_UNAUTHORIZED};

impl<'a, S: State> Layer<'a, S> {
    // === Administration ===

    pub(in crate::layer) async fn handle_set_config(
        &mut self,
        public: &PublicKey,
        config: &EngineConfig,
    ) -> anyhow::Result<Vec<Event>> {
        if !is_admin_public_key(public) {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_UNAUTHORIZED,
                "Unauthorized admin instruction",
            ));
        }
        if let Err(err) = config.validate() {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_INVALID_CONFIG,
                format!("Rejected configuration: {err}"),
            ));
        }

        self.insert(Key::Config, Value::Config(config.clone()));
        tracing::info!("engine configuration updated");

        Ok(vec![Event::ConfigUpdated])
    }

    pub(in crate::layer) async fn handle_mint(
        &mut self,
        public: &PublicKey,
        to: &PublicKey,
        amount: u64,
    ) -> anyhow::Result<Vec<Event>> {
        if !is_admin_public_key(public) {
            return Ok(wager_error_vec(
                public,
                None,
                ERROR_UNAUTHORIZED,
                "Unauthorized admin instruction",
            ));
        }

        let mut account = self.get_token_account(to).await?;
        account.balance = account.balance.saturating_add(amount);
        let mut pool = self.get_or_init_pool().await?;
        pool.total_issued = pool.total_issued.saturating_add(amount);

        self.insert(Key::TokenAccount(to.clone()), Value::TokenAccount(account));
        self.insert(Key::Pool, Value::Pool(pool));

        Ok(vec![Event::Minted {
            to: to.clone(),
            amount,
        }])
    }
}
