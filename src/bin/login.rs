//! Session initialization binary.
//!
//! Usage: login [phone-or-label]

use moontele::commands::{login, Context};
use moontele::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let ctx = Context::new(Config::new(), std::env::args().nth(1));
    login::run(&ctx).await?;
    Ok(())
}
