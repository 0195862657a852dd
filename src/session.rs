//! Per-account Telegram sessions
//!
//! Provides:
//! - File-based session locking so two processes never share an account session
//! - Client creation over an SQLite session file
//! - Interactive sign-in (login code and optional 2FA password)

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use grammers_client::{Client, SignInError};
use grammers_mtsender::SenderPool;
use grammers_session::storages::SqliteSession;
use tracing::{debug, info};

use crate::accounts::Account;
use crate::chat::GrammersMessenger;
use crate::config::Config;
use crate::console;
use crate::error::{Error, Result};

/// Session lock guard that ensures exclusive access to one account's session.
pub struct SessionLock {
    path: PathBuf,
    lock_file: Option<File>,
}

impl SessionLock {
    /// Acquire an exclusive lock on `path`.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::LockError(format!("Failed to open lock file: {}", e)))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                lock_file: Some(lock_file),
            }),
            Err(_) => {
                eprintln!(
                    r#"
⚠️  This account's session is already in use by another moontele process.

Wait for it to finish and try again.
"#
                );
                Err(Error::SessionLocked)
            }
        }
    }

    /// Release the lock manually
    pub fn release(&mut self) {
        if let Some(ref file) = self.lock_file {
            let _ = file.unlock();
        }
        if self.lock_file.take().is_some() {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Whether a session file exists for `phone`.
pub fn session_exists(config: &Config, phone: &str) -> bool {
    config.session_file(phone).exists()
}

/// Open (or create) the SQLite session for `phone`.
pub fn open_session(config: &Config, phone: &str) -> Result<Arc<SqliteSession>> {
    let session_file = config.session_file(phone);
    if let Some(parent) = session_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let session = SqliteSession::open(&session_file).map_err(|e| {
        Error::SessionNotFound(format!(
            "Failed to open session {}: {}",
            session_file.display(),
            e
        ))
    })?;
    Ok(Arc::new(session))
}

/// Client plus the task driving its sender pool
pub struct TelegramClient {
    pub client: Client,
    _runner_handle: tokio::task::JoinHandle<()>,
}

impl TelegramClient {
    pub async fn connect(session: Arc<SqliteSession>, api_id: i32) -> Result<Self> {
        let pool = SenderPool::new(session, api_id);
        let client = Client::new(&pool);

        let SenderPool { runner, .. } = pool;

        let runner_handle = tokio::spawn(async move {
            runner.run().await;
        });

        Ok(Self {
            client,
            _runner_handle: runner_handle,
        })
    }
}

impl std::ops::Deref for TelegramClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// A connected client plus the lock that guards its session.
pub struct AccountSession {
    pub client: TelegramClient,
    session: Arc<SqliteSession>,
    _lock: SessionLock,
}

impl AccountSession {
    /// Messenger that remembers resolved peers in this account's session file.
    pub fn messenger(&self) -> GrammersMessenger<'_> {
        GrammersMessenger::new(&self.client.client).with_peer_cache(self.session.clone())
    }
}

impl std::ops::Deref for AccountSession {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Lock, open and connect the session for `account`.
pub async fn connect(config: &Config, account: &Account) -> Result<AccountSession> {
    let lock = SessionLock::acquire(config.lock_file(&account.phone))?;
    let session = open_session(config, &account.phone)?;
    debug!(phone = %account.phone, "Connecting");
    let client = TelegramClient::connect(session.clone(), account.api_id).await?;
    Ok(AccountSession {
        client,
        session,
        _lock: lock,
    })
}

/// `"first last (@username)"`, omitting the username part when there is none.
pub fn display_name(full_name: &str, username: Option<&str>) -> String {
    let full_name = full_name.trim();
    match username {
        Some(username) if !username.is_empty() => format!("{} (@{})", full_name, username),
        _ => full_name.to_string(),
    }
}

/// Sign in interactively when the session is not yet authorized.
///
/// Returns the display name of the logged-in user.
pub async fn ensure_authorized(client: &Client, account: &Account) -> Result<String> {
    if !client.is_authorized().await? {
        info!(phone = %account.phone, "Session not authorized, requesting login code");
        println!("📱 Requesting login code for {}...", account.phone);

        let token = client
            .request_login_code(&account.phone, &account.api_hash)
            .await
            .map_err(|e| Error::TelegramError(format!("Failed to request code: {}", e)))?;

        let code = console::prompt("Enter the code you received: ")?;

        match client.sign_in(&token, &code).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token
                    .hint()
                    .map(|h| h.to_string())
                    .unwrap_or_else(|| "none".to_string());
                let password = console::prompt(&format!("2FA password (hint: {}): ", hint))?;
                client
                    .check_password(password_token, password.as_bytes())
                    .await
                    .map_err(|e| Error::TelegramError(format!("Failed to check password: {}", e)))?;
            }
            Err(e) => {
                return Err(Error::TelegramError(format!("Failed to sign in: {}", e)));
            }
        }
    }

    let me = client.get_me().await?;
    Ok(display_name(&me.full_name(), me.username()))
}
