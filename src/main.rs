//! MoonTele CLI - main entry point

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use moontele::commands::{self, Context};
use moontele::{metrics, Config};
use tracing::warn;

#[derive(Parser)]
#[command(name = "moontele")]
#[command(about = "Broadcast messages to saved Telegram targets", long_about = None)]
#[command(version)]
struct Cli {
    /// Account to use (phone number or label); defaults to the first account
    #[arg(short, long, env = "MOONTELE_ACCOUNT", global = true)]
    account: Option<String>,

    /// Path to config.yml
    #[arg(long, env = "MOONTELE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: AccountsAction,
    },

    /// Authorize the active account and show who is logged in
    Login,

    /// Resolve an id or t.me link and print the target
    Resolve {
        /// Numeric id (123, -100123, -123) or t.me link
        input: String,
    },

    /// Manage target templates of the active account
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Send a message to every target of a template
    Broadcast {
        /// Template name
        template: String,

        /// Message text
        #[arg(long, group = "source")]
        text: Option<String>,

        /// Read message text from a file
        #[arg(long, group = "source")]
        text_file: Option<PathBuf>,

        /// Link to an existing message to copy or forward
        #[arg(long, group = "source")]
        from_link: Option<String>,

        /// Forward the linked message instead of sending a copy
        #[arg(long, default_value_t = false, requires = "from_link")]
        forward: bool,

        /// Seconds to wait after each send
        #[arg(long)]
        delay: Option<f64>,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },

    /// Interactive menu
    Menu,
}

#[derive(Subcommand)]
enum AccountsAction {
    /// List accounts (* marks the active one)
    List,

    /// Add an account; missing values are prompted for
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        api_id: Option<String>,
        #[arg(long)]
        api_hash: Option<String>,
    },

    /// Remove the account at a 1-based position
    Remove {
        position: usize,
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List templates with target counts
    List,

    /// Show the targets of a template
    Show { name: String },

    /// Create a template from ids and t.me links
    Create {
        name: String,
        inputs: Vec<String>,
        /// Overwrite an existing template
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Add targets to a template
    Add {
        name: String,
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Remove the target at a 1-based position
    Remove { name: String, position: usize },

    /// Delete a template
    Delete {
        name: String,
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Accounts { action } => match action {
                AccountsAction::List => "accounts_list",
                AccountsAction::Add { .. } => "accounts_add",
                AccountsAction::Remove { .. } => "accounts_remove",
            },
            Commands::Login => "login",
            Commands::Resolve { .. } => "resolve",
            Commands::Templates { action } => match action {
                TemplatesAction::List => "templates_list",
                TemplatesAction::Show { .. } => "templates_show",
                TemplatesAction::Create { .. } => "templates_create",
                TemplatesAction::Add { .. } => "templates_add",
                TemplatesAction::Remove { .. } => "templates_remove",
                TemplatesAction::Delete { .. } => "templates_delete",
            },
            Commands::Broadcast { .. } => "broadcast",
            Commands::Menu => "menu",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("moontele=info".parse()?))
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_file(path).map_err(anyhow::Error::msg)?,
        None => Config::new(),
    };
    let mut ctx = Context::new(config, cli.account);

    let command_name = cli.command.name();
    metrics::record_command_start(command_name);
    let start = Instant::now();

    let result = execute_command(&mut ctx, cli.command).await;

    metrics::record_command_result(command_name, start.elapsed(), result.is_ok());

    result
}

async fn execute_command(ctx: &mut Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Accounts { action } => match action {
            AccountsAction::List => commands::accounts::list(ctx)?,
            AccountsAction::Add {
                name,
                phone,
                api_id,
                api_hash,
            } => {
                commands::accounts::add(
                    ctx,
                    commands::accounts::NewAccount {
                        name,
                        phone,
                        api_id,
                        api_hash,
                    },
                )?;
            }
            AccountsAction::Remove { position, yes } => {
                commands::accounts::remove(ctx, position, yes)?;
            }
        },
        Commands::Login => {
            commands::login::run(ctx).await?;
        }
        Commands::Resolve { input } => {
            commands::resolve::run(ctx, &input).await?;
        }
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(ctx)?,
            TemplatesAction::Show { name } => commands::templates::show(ctx, &name)?,
            TemplatesAction::Create {
                name,
                inputs,
                force,
            } => {
                let inputs = if inputs.is_empty() {
                    moontele::console::read_items(
                        "Paste IDs or t.me links (empty line to finish):",
                    )?
                } else {
                    inputs
                };
                commands::templates::create(ctx, &name, &inputs, force).await?;
            }
            TemplatesAction::Add { name, inputs } => {
                commands::templates::add(ctx, &name, &inputs).await?;
            }
            TemplatesAction::Remove { name, position } => {
                commands::templates::remove(ctx, &name, position)?;
            }
            TemplatesAction::Delete { name, yes } => {
                commands::templates::delete(ctx, &name, yes)?;
            }
        },
        Commands::Broadcast {
            template,
            text,
            text_file,
            from_link,
            forward,
            delay,
            yes,
        } => {
            let source = match (text, text_file, from_link) {
                (Some(text), _, _) => commands::broadcast::MessageSource::Text(text),
                (_, Some(path), _) => commands::broadcast::MessageSource::TextFile(path),
                (_, _, Some(link)) => commands::broadcast::MessageSource::Link { link, forward },
                (None, None, None) => commands::broadcast::MessageSource::Text(
                    moontele::console::read_multiline("Message text (empty line to finish):")?,
                ),
            };
            commands::broadcast::run(
                ctx,
                commands::broadcast::BroadcastArgs {
                    template,
                    source,
                    delay,
                    yes,
                },
            )
            .await?;
        }
        Commands::Menu => {
            commands::menu::run(ctx).await?;
        }
    }

    Ok(())
}
