//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI. Operations that need
//! Telegram come in two layers: a `*_with` function generic over
//! [`Messenger`](crate::messenger::Messenger), shared with the interactive
//! menu, and a thin entry point that connects the active account first.

pub mod accounts;
pub mod broadcast;
pub mod login;
pub mod menu;
pub mod resolve;
pub mod templates;

use tracing::info;

use crate::accounts::{Account, AccountStore};
use crate::config::Config;
use crate::error::Result;
use crate::session::{self, AccountSession};
use crate::templates::TemplateStore;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    /// Phone number or label picked with `--account`; the first account otherwise.
    pub account: Option<String>,
}

impl Context {
    pub fn new(config: Config, account: Option<String>) -> Self {
        Self { config, account }
    }

    pub fn accounts(&self) -> Result<AccountStore> {
        AccountStore::open(&self.config)
    }

    pub fn templates(&self) -> TemplateStore {
        TemplateStore::open(&self.config)
    }

    pub fn active_account(&self) -> Result<Account> {
        Ok(self.accounts()?.active(self.account.as_deref())?.clone())
    }

    /// Connect the active account, signing in interactively when needed.
    pub async fn connect(&self) -> Result<(Account, AccountSession)> {
        let mut store = self.accounts()?;
        let account = store.active(self.account.as_deref())?.clone();

        let session = session::connect(&self.config, &account).await?;
        let name = session::ensure_authorized(&session, &account).await?;
        info!(phone = %account.phone, user = %name, "Logged in");

        if account.real_name.as_deref() != Some(name.as_str()) {
            store.set_real_name(&account.phone, &name)?;
        }
        let account = store.active(Some(account.phone.as_str()))?.clone();
        Ok((account, session))
    }
}

/// `Label (real name)` when the display name is known.
pub fn account_label(account: &Account) -> String {
    match &account.real_name {
        Some(real) => format!("{} ({})", account.name, real),
        None => account.name.clone(),
    }
}
