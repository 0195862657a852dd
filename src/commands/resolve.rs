//! Resolve a single input and print the target

use crate::commands::Context;
use crate::error::Result;
use crate::resolve::resolve_target;
use crate::target::Target;

/// Multi-line description of a target.
pub fn format_target(target: &Target) -> String {
    let mut out = format!(
        "Chat:  {}\nID:    {}\nType:  {}",
        target.chat_title, target.chat_id, target.kind
    );
    if let Some(topic_id) = target.topic_id {
        out.push_str(&format!(
            "\nTopic: {} (#{})",
            target.topic_title.as_deref().unwrap_or("?"),
            topic_id
        ));
    }
    out
}

pub async fn run(ctx: &Context, input: &str) -> Result<Target> {
    let (_account, session) = ctx.connect().await?;
    let messenger = session.messenger();

    println!("🔍 Resolving {}...", input.trim());
    let target = resolve_target(&messenger, input).await?;

    println!("{}", format_target(&target));
    println!("\n{}", serde_json::to_string_pretty(&target)?);
    Ok(target)
}
