//! `accounts` subcommands

use crate::accounts::{parse_api_id, Account};
use crate::commands::{account_label, Context};
use crate::console;
use crate::error::{Error, Result};

/// Values given on the command line; missing ones are prompted for.
#[derive(Debug, Default, Clone)]
pub struct NewAccount {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub api_id: Option<String>,
    pub api_hash: Option<String>,
}

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.accounts()?;
    if store.is_empty() {
        println!("No accounts yet. Add one with `moontele accounts add`.");
        return Ok(());
    }

    let active = store.active(ctx.account.as_deref()).ok().map(|a| a.phone.clone());
    println!("👤 Accounts:");
    for (i, account) in store.accounts().iter().enumerate() {
        let marker = if active.as_deref() == Some(account.phone.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}. {} [{}]",
            marker,
            i + 1,
            account_label(account),
            account.phone
        );
    }
    Ok(())
}

fn value_or_prompt(value: Option<String>, question: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => console::prompt(question),
    }
}

pub fn add(ctx: &Context, new: NewAccount) -> Result<Account> {
    let phone = value_or_prompt(new.phone, "Phone number (international format): ")?;
    if phone.is_empty() {
        return Err(Error::InvalidArgument("phone number is required".to_string()));
    }
    let api_id = parse_api_id(&value_or_prompt(new.api_id, "API ID: ")?)?;
    let api_hash = value_or_prompt(new.api_hash, "API Hash: ")?;
    if api_hash.is_empty() {
        return Err(Error::InvalidArgument("API hash is required".to_string()));
    }
    let name = match new.name {
        Some(name) => name,
        None => console::prompt("Label (empty for default): ")?,
    };

    let account = Account::new(&name, &phone, api_id, &api_hash);
    let mut store = ctx.accounts()?;
    store.add(account.clone())?;
    println!("✅ Account '{}' added.", account.name);
    Ok(account)
}

/// Remove the account at a 1-based position.
pub fn remove(ctx: &Context, position: usize, yes: bool) -> Result<()> {
    let mut store = ctx.accounts()?;
    let active = store.active(ctx.account.as_deref()).ok().map(|a| a.phone.clone());

    let label = store
        .accounts()
        .get(position.wrapping_sub(1))
        .map(account_label)
        .ok_or_else(|| Error::InvalidArgument(format!("no account #{}", position)))?;

    if !yes && !console::confirm(&format!("Delete account '{}'?", label))? {
        println!("Cancelled.");
        return Ok(());
    }

    let removed = store.remove(position, active.as_deref())?;
    println!("🗑️  Account '{}' removed.", removed.name);
    Ok(())
}
