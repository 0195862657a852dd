//! Configuration for storage paths and broadcast defaults
//!
//! Loads configuration from config.yml file, with `${VAR}` placeholders and
//! environment overrides.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default constants (fallback if config.yml not found)
pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const TEMPLATE_FILE: &str = "target_templates.json";
/// Legacy single-account credentials: api_id, api_hash and phone on three lines.
pub const CREDENTIALS_FILE: &str = "credentials.txt";
pub const SESSION_PREFIX: &str = "session_";
pub const DEFAULT_DELAY_SECS: f64 = 5.0;

/// Env var overriding the data directory
pub const DATA_DIR_ENV: &str = "MOONTELE_DATA_DIR";
/// Env var overriding the default delay between sends
pub const DELAY_ENV: &str = "MOONTELE_DELAY";

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    storage: Option<StorageConfig>,
    broadcast: Option<BroadcastConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageConfig {
    data_dir: Option<String>,
    accounts_file: Option<String>,
    templates_file: Option<String>,
    credentials_file: Option<String>,
    session_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BroadcastConfig {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    delay_secs: Option<String>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub accounts_file: PathBuf,
    pub templates_file: PathBuf,
    pub credentials_file: PathBuf,
    pub session_dir: PathBuf,
    pub default_delay: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load_from_file("config.yml").unwrap_or_else(|_| {
            Self::load_dotenv();
            Self::from_yaml(YamlConfig::default())
        })
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return Some(env_val);
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return Some(env_val);
        }
        value.filter(|v| !(v.starts_with("${") && v.ends_with('}')))
    }

    /// Resolve the delay from string config or env var
    fn resolve_env_delay(value: Option<String>) -> f64 {
        Self::resolve_env_string(value, DELAY_ENV)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|d| std::time::Duration::try_from_secs_f64(*d).is_ok())
            .unwrap_or(DEFAULT_DELAY_SECS)
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let yaml: YamlConfig = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(Self::from_yaml(yaml))
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        let storage = yaml.storage.unwrap_or_default();
        let broadcast = yaml.broadcast.unwrap_or_default();

        let data_dir = PathBuf::from(
            Self::resolve_env_string(storage.data_dir, DATA_DIR_ENV)
                .unwrap_or_else(|| ".".to_string()),
        );

        let in_data_dir = |value: Option<String>, default: &str| -> PathBuf {
            let file = value.unwrap_or_else(|| default.to_string());
            data_dir.join(file)
        };

        let accounts_file = in_data_dir(storage.accounts_file, ACCOUNTS_FILE);
        let templates_file = in_data_dir(storage.templates_file, TEMPLATE_FILE);
        let credentials_file = in_data_dir(storage.credentials_file, CREDENTIALS_FILE);
        let session_dir = match storage.session_dir {
            Some(dir) => data_dir.join(dir),
            None => data_dir.clone(),
        };

        Self {
            accounts_file,
            templates_file,
            credentials_file,
            session_dir,
            default_delay: Self::resolve_env_delay(broadcast.delay_secs),
            data_dir,
        }
    }

    /// Create config rooted at a directory (no file, no env)
    pub fn with_data_dir<P: AsRef<Path>>(dir: P) -> Self {
        let data_dir = dir.as_ref().to_path_buf();
        Self {
            accounts_file: data_dir.join(ACCOUNTS_FILE),
            templates_file: data_dir.join(TEMPLATE_FILE),
            credentials_file: data_dir.join(CREDENTIALS_FILE),
            session_dir: data_dir.clone(),
            default_delay: DEFAULT_DELAY_SECS,
            data_dir,
        }
    }

    /// Session file for an account phone number
    pub fn session_file(&self, phone: &str) -> PathBuf {
        self.session_dir
            .join(format!("{}{}.session", SESSION_PREFIX, phone))
    }

    /// Lock file guarding an account session
    pub fn lock_file(&self, phone: &str) -> PathBuf {
        self.session_dir
            .join(format!("{}{}.lock", SESSION_PREFIX, phone))
    }
}
