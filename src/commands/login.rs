//! Session initialization command

use crate::commands::{account_label, Context};
use crate::error::Result;
use crate::session;

pub async fn run(ctx: &Context) -> Result<()> {
    let account = ctx.active_account()?;

    if session::session_exists(&ctx.config, &account.phone) {
        println!("🔄 Reusing session for {}...", account.phone);
    } else {
        println!(
            "🔄 Creating a new session for {} at {}",
            account.phone,
            ctx.config.session_file(&account.phone).display()
        );
    }

    let (account, _session) = ctx.connect().await?;

    println!(
        r#"
✅ Logged in

Account: {}
Phone:   {}
Session: {}
"#,
        account_label(&account),
        account.phone,
        ctx.config.session_file(&account.phone).display()
    );

    Ok(())
}
