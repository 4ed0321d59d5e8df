use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::persona::Persona;
use crate::core::session::StaleReplyPolicy;

pub const DEFAULT_USER_ID: &str = "web_user_001";

/// On-disk configuration. Every field is optional; environment variables
/// and the keyring fill in or override values when settings are resolved.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat endpoint URL the answer request is POSTed to
    pub endpoint: Option<String>,
    /// Bearer token; prefer `beautydesk auth` so it lives in the keyring
    pub token: Option<String>,
    pub bot_id_basic: Option<String>,
    pub bot_id_cutie: Option<String>,
    /// Caller identifier sent with every request
    pub user_id: Option<String>,
    pub welcome_basic: Option<String>,
    pub welcome_cutie: Option<String>,
    pub default_persona: Option<Persona>,
    pub stale_replies: Option<StaleReplyPolicy>,
    pub request_timeout_secs: Option<u64>,
}

/// Keys accepted by `beautydesk set` / `beautydesk unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "token",
    "bot-id-basic",
    "bot-id-cutie",
    "user-id",
    "welcome-basic",
    "welcome-cutie",
    "default-persona",
    "stale-replies",
    "request-timeout-secs",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKeyError {
    UnknownKey(String),
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKeyError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (known keys: {})",
                CONFIG_KEYS.join(", ")
            ),
            ConfigKeyError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigKeyError {}

impl Config {
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let text = Some(value.to_string());
        match key {
            "endpoint" => self.endpoint = text,
            "token" => self.token = text,
            "bot-id-basic" => self.bot_id_basic = text,
            "bot-id-cutie" => self.bot_id_cutie = text,
            "user-id" => self.user_id = text,
            "welcome-basic" => self.welcome_basic = text,
            "welcome-cutie" => self.welcome_cutie = text,
            "default-persona" => {
                let persona = value
                    .parse::<Persona>()
                    .map_err(|reason| invalid(key, reason))?;
                self.default_persona = Some(persona);
            }
            "stale-replies" => {
                let policy = value
                    .parse::<StaleReplyPolicy>()
                    .map_err(|reason| invalid(key, reason))?;
                self.stale_replies = Some(policy);
            }
            "request-timeout-secs" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|err| invalid(key, err.to_string()))?;
                if secs == 0 {
                    return Err(invalid(
                        key,
                        "must be at least 1 second; unset it to disable the timeout".to_string(),
                    ));
                }
                self.request_timeout_secs = Some(secs);
            }
            _ => return Err(ConfigKeyError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_key(&mut self, key: &str) -> Result<(), ConfigKeyError> {
        match key {
            "endpoint" => self.endpoint = None,
            "token" => self.token = None,
            "bot-id-basic" => self.bot_id_basic = None,
            "bot-id-cutie" => self.bot_id_cutie = None,
            "user-id" => self.user_id = None,
            "welcome-basic" => self.welcome_basic = None,
            "welcome-cutie" => self.welcome_cutie = None,
            "default-persona" => self.default_persona = None,
            "stale-replies" => self.stale_replies = None,
            "request-timeout-secs" => self.request_timeout_secs = None,
            _ => return Err(ConfigKeyError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: String) -> ConfigKeyError {
    ConfigKeyError::InvalidValue {
        key: key.to_string(),
        reason,
    }
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
