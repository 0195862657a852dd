//! `templates` subcommands

use tracing::warn;

use crate::commands::Context;
use crate::console;
use crate::error::{Error, Result};
use crate::messenger::Messenger;
use crate::resolve::resolve_target;
use crate::target::Target;
use crate::templates::{self, TemplateStore, Templates};

/// Resolve each input, printing one line per input. Failures are skipped.
pub async fn resolve_inputs<M: Messenger>(messenger: &M, inputs: &[String]) -> Vec<Target> {
    let mut targets = Vec::new();
    for input in inputs.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
        match resolve_target(messenger, input).await {
            Ok(target) => {
                println!("✅ Added: {}", target.short_label());
                targets.push(target);
            }
            Err(e) => {
                warn!(input, error = %e, "Could not resolve target");
                println!("❌ {}: {}", input, e);
            }
        }
    }
    targets
}

pub fn format_list(templates: &Templates) -> String {
    if templates.is_empty() {
        return "No templates saved.".to_string();
    }
    templates
        .iter()
        .map(|(name, targets)| format!("  • {} ({} targets)", name, targets.len()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_targets(name: &str, targets: &[Target]) -> String {
    let mut lines = vec![format!("📋 {} ({} targets)", name, targets.len())];
    for (i, target) in targets.iter().enumerate() {
        let topic = match (&target.topic_title, target.topic_id) {
            (Some(title), Some(id)) => format!(" > {} (#{})", title, id),
            (None, Some(id)) => format!(" > Topic {}", id),
            _ => String::new(),
        };
        lines.push(format!(
            "  {}. {} [{}]{}",
            i + 1,
            target.chat_title,
            target.kind,
            topic
        ));
    }
    lines.join("\n")
}

pub fn list(ctx: &Context) -> Result<()> {
    let account = ctx.active_account()?;
    let templates = ctx.templates().load(&account.phone)?;
    println!("📁 Templates for {}:", account.name);
    println!("{}", format_list(&templates));
    Ok(())
}

pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let account = ctx.active_account()?;
    let templates = ctx.templates().load(&account.phone)?;
    println!("{}", format_targets(name, templates::get(&templates, name)?));
    Ok(())
}

/// Resolve `inputs` and save them as template `name`. Returns the target count.
pub async fn create_with<M: Messenger>(
    messenger: &M,
    store: &TemplateStore,
    phone: &str,
    name: &str,
    inputs: &[String],
    force: bool,
) -> Result<usize> {
    let mut saved = store.load(phone)?;
    if saved.contains_key(name.trim()) && !force {
        return Err(Error::InvalidArgument(format!(
            "template '{}' already exists (use --force to overwrite)",
            name.trim()
        )));
    }

    let targets = resolve_inputs(messenger, inputs).await;
    templates::create(&mut saved, name, targets, force)?;
    store.save(phone, &saved)?;

    let count = saved.get(name.trim()).map(Vec::len).unwrap_or(0);
    println!("💾 Template '{}' saved with {} targets.", name.trim(), count);
    Ok(count)
}

/// Resolve `inputs` and append them to an existing template. Returns how many were added.
pub async fn add_with<M: Messenger>(
    messenger: &M,
    store: &TemplateStore,
    phone: &str,
    name: &str,
    inputs: &[String],
) -> Result<usize> {
    let mut saved = store.load(phone)?;
    templates::get(&saved, name)?;

    let mut added = 0;
    for target in resolve_inputs(messenger, inputs).await {
        if templates::add_target(&mut saved, name, target.clone())? {
            added += 1;
        } else {
            println!("⚠️  Already in '{}': {}", name, target.short_label());
        }
    }

    if added > 0 {
        store.save(phone, &saved)?;
    }
    Ok(added)
}

pub async fn create(ctx: &Context, name: &str, inputs: &[String], force: bool) -> Result<()> {
    let (account, session) = ctx.connect().await?;
    let messenger = session.messenger();
    create_with(&messenger, &ctx.templates(), &account.phone, name, inputs, force).await?;
    Ok(())
}

pub async fn add(ctx: &Context, name: &str, inputs: &[String]) -> Result<()> {
    let (account, session) = ctx.connect().await?;
    let messenger = session.messenger();
    let added = add_with(&messenger, &ctx.templates(), &account.phone, name, inputs).await?;
    println!("💾 {} target(s) added to '{}'.", added, name);
    Ok(())
}

pub fn remove_from(store: &TemplateStore, phone: &str, name: &str, position: usize) -> Result<Target> {
    let mut saved = store.load(phone)?;
    let removed = templates::remove_target(&mut saved, name, position)?;
    store.save(phone, &saved)?;
    println!("🗑️  Removed {} from '{}'.", removed.short_label(), name);
    Ok(removed)
}

pub fn remove(ctx: &Context, name: &str, position: usize) -> Result<()> {
    let account = ctx.active_account()?;
    remove_from(&ctx.templates(), &account.phone, name, position)?;
    Ok(())
}

pub fn delete_from(store: &TemplateStore, phone: &str, name: &str, yes: bool) -> Result<bool> {
    let mut saved = store.load(phone)?;
    templates::get(&saved, name)?;

    if !yes && !console::confirm(&format!("Delete template '{}'?", name))? {
        println!("Cancelled.");
        return Ok(false);
    }

    templates::delete(&mut saved, name)?;
    store.save(phone, &saved)?;
    println!("🗑️  Template '{}' deleted.", name);
    Ok(true)
}

pub fn delete(ctx: &Context, name: &str, yes: bool) -> Result<()> {
    let account = ctx.active_account()?;
    delete_from(&ctx.templates(), &account.phone, name, yes)?;
    Ok(())
}
