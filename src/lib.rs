//! Telegram broadcast library
//!
//! This library provides tools to:
//! - Manage several Telegram accounts, each with its own session
//! - Resolve users, groups, channels and forum topics from ids or `t.me` links
//! - Keep named target templates per account
//! - Send text, copies or forwards to every target of a template with a delay

pub mod accounts;
pub mod broadcast;
pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod link;
pub mod messenger;
pub mod metrics;
pub mod resolve;
pub mod session;
pub mod target;
pub mod templates;

// Re-export common types
pub use accounts::{Account, AccountStore};
pub use broadcast::{broadcast, BroadcastOptions, BroadcastReport, Payload};
pub use config::Config;
pub use error::{Error, Result};
pub use link::{parse_input, parse_link, parse_message_link};
pub use messenger::Messenger;
pub use resolve::resolve_target;
pub use session::SessionLock;
pub use target::{Target, TargetKind};
pub use templates::{TemplateStore, Templates};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
