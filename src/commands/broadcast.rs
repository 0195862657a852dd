//! Send a message to every target of a template

use std::path::PathBuf;

use crate::broadcast::{broadcast, BroadcastEvent, BroadcastOptions, BroadcastReport, Payload};
use crate::commands::Context;
use crate::console;
use crate::error::{Error, Result};
use crate::link::parse_message_link;
use crate::messenger::Messenger;
use crate::target::Target;
use crate::templates;

/// Where the broadcast message comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageSource {
    Text(String),
    TextFile(PathBuf),
    /// An existing message; `forward` keeps the original author header.
    Link { link: String, forward: bool },
}

#[derive(Debug, Clone)]
pub struct BroadcastArgs {
    pub template: String,
    pub source: MessageSource,
    /// Seconds between sends; the configured default when absent.
    pub delay: Option<f64>,
    pub yes: bool,
}

/// Console output for one loop event.
pub fn print_event(event: &BroadcastEvent<'_>) {
    if let BroadcastEvent::Sending {
        index,
        total,
        target,
    } = event
    {
        println!("[{}/{}] Sending to {}...", index + 1, total, target.describe());
    }
    if let Some(line) = event.outcome_line() {
        println!("{}", line);
    }
}

/// Build the payload for `source` using `messenger` to fetch linked messages.
pub async fn load_payload<M: Messenger>(
    messenger: &M,
    source: &MessageSource,
) -> Result<Payload<M::Message>> {
    match source {
        MessageSource::Text(text) => text_payload(text.clone()),
        MessageSource::TextFile(path) => text_payload(std::fs::read_to_string(path)?),
        MessageSource::Link { link, forward } => {
            let link = parse_message_link(link)?;
            let message = messenger.fetch_message(&link).await?.ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "message {} not found in {}",
                    link.message_id, link.chat
                ))
            })?;
            Ok(Payload::Existing {
                message,
                as_forward: *forward,
            })
        }
    }
}

fn text_payload<M>(text: String) -> Result<Payload<M>> {
    let text = text.trim_end().to_string();
    if text.trim().is_empty() {
        return Err(Error::InvalidArgument("message text is empty".to_string()));
    }
    Ok(Payload::Text(text))
}

/// Confirm (unless `yes`) and run the send loop, printing progress.
pub async fn run_with<M: Messenger>(
    messenger: &M,
    targets: &[Target],
    payload: &Payload<M::Message>,
    options: BroadcastOptions,
    yes: bool,
) -> Result<Option<BroadcastReport>> {
    println!(
        "📤 {} to {} targets, {:.1}s between sends.",
        payload.mode().verb(),
        targets.len(),
        options.delay.as_secs_f64()
    );
    if !yes && !console::confirm("Start broadcast?")? {
        println!("Cancelled.");
        return Ok(None);
    }

    let report = broadcast(messenger, targets, payload, options, print_event).await;
    println!("\n{}", report.summary());
    Ok(Some(report))
}

pub async fn run(ctx: &Context, args: BroadcastArgs) -> Result<()> {
    let options = BroadcastOptions::from_secs(args.delay.unwrap_or(ctx.config.default_delay))?;

    let account = ctx.active_account()?;
    let saved = ctx.templates().load(&account.phone)?;
    let targets = templates::get(&saved, &args.template)?.to_vec();
    if targets.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "template '{}' has no targets",
            args.template
        )));
    }

    let (_account, session) = ctx.connect().await?;
    let messenger = session.messenger();
    let payload = load_payload(&messenger, &args.source).await?;

    run_with(&messenger, &targets, &payload, options, args.yes).await?;
    Ok(())
}
