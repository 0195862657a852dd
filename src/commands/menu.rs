//! Interactive console menu
//!
//! One connection per selected account; switching accounts reconnects.

use tracing::warn;

use crate::broadcast::BroadcastOptions;
use crate::chat::GrammersMessenger;
use crate::commands::broadcast::{load_payload, run_with, MessageSource};
use crate::commands::templates::{
    add_with, create_with, delete_from, format_list, format_targets, remove_from,
};
use crate::commands::{account_label, accounts, Context};
use crate::console;
use crate::error::{Error, Result};
use crate::templates;

/// What the user picked in a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Templates,
    Broadcast,
    Accounts,
    Exit,
}

fn parse_main(input: &str) -> Option<Choice> {
    match input.trim() {
        "1" => Some(Choice::Templates),
        "2" => Some(Choice::Broadcast),
        "3" => Some(Choice::Accounts),
        "0" | "q" | "exit" => Some(Choice::Exit),
        _ => None,
    }
}

/// Result of the accounts submenu.
enum AccountAction {
    Stay,
    Switch(String),
}

pub async fn run(ctx: &mut Context) -> Result<()> {
    if ctx.accounts()?.is_empty() {
        println!("No accounts configured yet, let's add one.");
        accounts::add(ctx, accounts::NewAccount::default())?;
    }

    loop {
        let (account, session) = ctx.connect().await?;
        let messenger = session.messenger();

        let switch_to = loop {
            println!(
                "\n=== MoonTele: {} ===\n1. Manage templates\n2. Broadcast\n3. Manage accounts\n0. Exit",
                account_label(&account)
            );
            let Some(choice) = parse_main(&console::prompt("> ")?) else {
                println!("Unknown option.");
                continue;
            };

            let outcome = match choice {
                Choice::Templates => templates_menu(ctx, &messenger, &account.phone)
                    .await
                    .map(|_| None),
                Choice::Broadcast => broadcast_menu(ctx, &messenger, &account.phone)
                    .await
                    .map(|_| None),
                Choice::Accounts => match accounts_menu(ctx, &account.phone) {
                    Ok(AccountAction::Switch(phone)) => Ok(Some(phone)),
                    Ok(AccountAction::Stay) => Ok(None),
                    Err(e) => Err(e),
                },
                Choice::Exit => return Ok(()),
            };

            match outcome {
                Ok(Some(phone)) => break phone,
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Menu action failed");
                    println!("❌ {}", e);
                }
            }
        };

        drop(messenger);
        drop(session);
        ctx.account = Some(switch_to);
    }
}

async fn templates_menu(ctx: &Context, messenger: &GrammersMessenger<'_>, phone: &str) -> Result<()> {
    let store = ctx.templates();
    loop {
        println!(
            "\n--- Templates ---\n1. List\n2. Show\n3. Create\n4. Add targets\n5. Remove target\n6. Delete\n0. Back"
        );
        match console::prompt("> ")?.as_str() {
            "1" => println!("{}", format_list(&store.load(phone)?)),
            "2" => {
                let name = console::prompt("Template name: ")?;
                let saved = store.load(phone)?;
                println!("{}", format_targets(&name, templates::get(&saved, &name)?));
            }
            "3" => {
                let name = console::prompt("Template name: ")?;
                let force = store.load(phone)?.contains_key(name.trim())
                    && console::confirm(&format!("'{}' exists. Overwrite?", name.trim()))?;
                let inputs =
                    console::read_items("Paste IDs or t.me links (empty line to finish):")?;
                create_with(messenger, &store, phone, &name, &inputs, force).await?;
            }
            "4" => {
                let name = console::prompt("Template name: ")?;
                let inputs =
                    console::read_items("Paste IDs or t.me links (empty line to finish):")?;
                let added = add_with(messenger, &store, phone, &name, &inputs).await?;
                println!("💾 {} target(s) added to '{}'.", added, name);
            }
            "5" => {
                let name = console::prompt("Template name: ")?;
                let saved = store.load(phone)?;
                println!("{}", format_targets(&name, templates::get(&saved, &name)?));
                let position = parse_position(&console::prompt("Number to remove: ")?)?;
                remove_from(&store, phone, &name, position)?;
            }
            "6" => {
                let name = console::prompt("Template name: ")?;
                delete_from(&store, phone, &name, false)?;
            }
            "0" => return Ok(()),
            _ => println!("Unknown option."),
        }
    }
}

async fn broadcast_menu(ctx: &Context, messenger: &GrammersMessenger<'_>, phone: &str) -> Result<()> {
    let saved = ctx.templates().load(phone)?;
    println!("{}", format_list(&saved));
    if saved.is_empty() {
        return Ok(());
    }

    let name = console::prompt("Template name: ")?;
    let targets = templates::get(&saved, &name)?;

    println!("1. Send text\n2. Send a copy of an existing message\n3. Forward an existing message");
    let source = match console::prompt("> ")?.as_str() {
        "1" => MessageSource::Text(console::read_multiline(
            "Message text (empty line to finish):",
        )?),
        choice @ ("2" | "3") => MessageSource::Link {
            link: console::prompt("Message link: ")?,
            forward: choice == "3",
        },
        other => {
            return Err(Error::InvalidArgument(format!("unknown mode '{}'", other)));
        }
    };
    let payload = load_payload(messenger, &source).await?;

    let delay = parse_delay(
        &console::prompt(&format!(
            "Delay between sends in seconds [{}]: ",
            ctx.config.default_delay
        ))?,
        ctx.config.default_delay,
    )?;
    let options = BroadcastOptions::from_secs(delay)?;

    run_with(messenger, targets, &payload, options, false).await?;
    Ok(())
}

fn accounts_menu(ctx: &Context, active_phone: &str) -> Result<AccountAction> {
    let scoped = Context::new(ctx.config.clone(), Some(active_phone.to_string()));
    loop {
        println!("\n--- Accounts ---\n1. List\n2. Add\n3. Remove\n4. Switch\n0. Back");
        match console::prompt("> ")?.as_str() {
            "1" => accounts::list(&scoped)?,
            "2" => {
                accounts::add(&scoped, accounts::NewAccount::default())?;
            }
            "3" => {
                accounts::list(&scoped)?;
                let position = parse_position(&console::prompt("Number to remove: ")?)?;
                accounts::remove(&scoped, position, false)?;
            }
            "4" => {
                accounts::list(&scoped)?;
                let position = parse_position(&console::prompt("Number to switch to: ")?)?;
                let store = scoped.accounts()?;
                let account = store
                    .accounts()
                    .get(position - 1)
                    .ok_or_else(|| Error::InvalidArgument(format!("no account #{}", position)))?;
                if account.phone != active_phone {
                    return Ok(AccountAction::Switch(account.phone.clone()));
                }
                println!("Already using {}.", account.name);
            }
            "0" => return Ok(AccountAction::Stay),
            _ => println!("Unknown option."),
        }
    }
}

/// 1-based position typed by the user.
fn parse_position(input: &str) -> Result<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::InvalidArgument(format!("'{}' is not a valid number", input.trim())))
}

/// Empty input keeps the default.
fn parse_delay(input: &str, default: f64) -> Result<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    input
        .parse::<f64>()
        .map_err(|_| Error::InvalidArgument(format!("'{}' is not a number", input)))
}
