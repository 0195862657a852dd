//! Account list persisted in `accounts.json`
//!
//! Also migrates the legacy `credentials.txt` (api_id, api_hash and phone on
//! three lines) into a single account on first load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// One Telegram login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub phone: String,
    #[serde(deserialize_with = "deserialize_api_id")]
    pub api_id: i32,
    pub api_hash: String,
    /// Display name cached after the last successful login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

impl Account {
    /// Create an account; an empty label becomes `Account <phone>`.
    pub fn new(name: &str, phone: &str, api_id: i32, api_hash: &str) -> Self {
        let phone = phone.trim().to_string();
        let name = match name.trim() {
            "" => default_label(&phone),
            label => label.to_string(),
        };
        Self {
            name,
            phone,
            api_id,
            api_hash: api_hash.trim().to_string(),
            real_name: None,
        }
    }
}

fn default_label(phone: &str) -> String {
    format!("Account {}", phone)
}

/// api_id was historically stored as a string.
fn deserialize_api_id<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| D::Error::custom(format!("api_id out of range: {}", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| D::Error::custom(format!("api_id is not a number: {:?}", s))),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Parse an API id typed by the user.
pub fn parse_api_id(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::InvalidArgument(format!("API ID must be a number, got '{}'", raw.trim())))
}

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: Vec<Account>,
}

impl AccountStore {
    /// Load the store at the configured paths.
    pub fn open(config: &Config) -> Result<Self> {
        Self::load(&config.accounts_file, &config.credentials_file)
    }

    /// Load accounts; a corrupt file yields an empty list.
    pub fn load(path: &Path, credentials: &Path) -> Result<Self> {
        let mut accounts: Vec<Account> = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable accounts file");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };

        let mut migrated = false;
        if accounts.is_empty() {
            if let Some(account) = read_legacy_credentials(credentials) {
                info!(phone = %account.phone, "Migrated legacy credentials file");
                accounts.push(account);
                migrated = true;
            }
        }

        let store = Self {
            path: path.to_path_buf(),
            accounts,
        };
        if migrated {
            store.save()?;
        }
        Ok(store)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.accounts)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Append an account and save; phone numbers must be unique.
    pub fn add(&mut self, account: Account) -> Result<()> {
        if account.phone.is_empty() {
            return Err(Error::InvalidArgument("phone number is required".to_string()));
        }
        if self.accounts.iter().any(|a| a.phone == account.phone) {
            return Err(Error::InvalidArgument(format!(
                "account {} already exists",
                account.phone
            )));
        }
        self.accounts.push(account);
        self.save()
    }

    /// Remove the account at a 1-based position; the active account cannot be removed.
    pub fn remove(&mut self, position: usize, active_phone: Option<&str>) -> Result<Account> {
        let index = position
            .checked_sub(1)
            .filter(|i| *i < self.accounts.len())
            .ok_or_else(|| Error::InvalidArgument(format!("no account #{}", position)))?;

        if active_phone == Some(self.accounts[index].phone.as_str()) {
            return Err(Error::InvalidArgument(
                "cannot delete the active account".to_string(),
            ));
        }

        let removed = self.accounts.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Find by phone number or label.
    pub fn find(&self, key: &str) -> Option<&Account> {
        let key = key.trim();
        self.accounts
            .iter()
            .find(|a| a.phone == key)
            .or_else(|| self.accounts.iter().find(|a| a.name == key))
    }

    /// The selected account, or the first one when nothing is selected.
    pub fn active(&self, selector: Option<&str>) -> Result<&Account> {
        match selector {
            Some(key) => self
                .find(key)
                .ok_or_else(|| Error::AccountNotFound(key.to_string())),
            None => self
                .accounts
                .first()
                .ok_or_else(|| Error::AccountNotFound("no accounts configured".to_string())),
        }
    }

    pub fn set_real_name(&mut self, phone: &str, real_name: &str) -> Result<()> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.phone == phone)
            .ok_or_else(|| Error::AccountNotFound(phone.to_string()))?;
        account.real_name = Some(real_name.to_string());
        self.save()
    }
}

fn read_legacy_credentials(path: &Path) -> Option<Account> {
    let content = fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    if lines.len() < 3 {
        return None;
    }
    match parse_api_id(lines[0]) {
        Ok(api_id) => Some(Account::new("", lines[2], api_id, lines[1])),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping legacy credentials");
            None
        }
    }
}
